//! Time-domain analyser
//!
//! A fixed-window ring of the most recent mono samples, written by the
//! capture callback and snapshotted by the sampler as unsigned bytes
//! centered at 128 (byte time-domain data). The window size is fixed by
//! the analysis configuration.

use parking_lot::Mutex;

use crate::constants::{ANALYSIS_WINDOW, ZERO_SIGNAL};

/// One tick's snapshot of raw waveform amplitudes
///
/// Ephemeral: recomputed every tick, never stored across ticks.
#[derive(Debug, Clone)]
pub struct SampleFrame {
    /// Unsigned amplitude bytes; 128 = zero signal
    pub amplitudes: Vec<u8>,
}

impl SampleFrame {
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }
}

struct Ring {
    /// Fixed-length sample storage, overwritten circularly
    samples: Vec<f32>,
    /// Next write position; also the oldest sample once wrapped
    pos: usize,
}

/// Analysis handle for an input stream
pub struct Analyser {
    ring: Mutex<Ring>,
}

impl Analyser {
    /// Create an analyser with the standard window size
    pub fn new() -> Self {
        Self::with_window(ANALYSIS_WINDOW)
    }

    /// Create an analyser with a custom window size
    pub fn with_window(window: usize) -> Self {
        assert!(window > 0, "analysis window must be non-empty");
        Self {
            ring: Mutex::new(Ring {
                samples: vec![0.0; window],
                pos: 0,
            }),
        }
    }

    /// Window size in samples
    pub fn window(&self) -> usize {
        self.ring.lock().samples.len()
    }

    /// Feed mono samples from the capture callback
    pub fn push_samples(&self, samples: &[f32]) {
        let mut guard = self.ring.lock();
        let ring = &mut *guard;
        let window = ring.samples.len();
        for &s in samples {
            let pos = ring.pos;
            ring.samples[pos] = s;
            ring.pos = (pos + 1) % window;
        }
    }

    /// Snapshot the current window as byte time-domain data
    ///
    /// Samples are returned oldest first. Positions never written since
    /// the last reset read as zero signal (byte 128).
    pub fn byte_time_domain(&self) -> SampleFrame {
        let guard = self.ring.lock();
        let n = guard.samples.len();
        let mut amplitudes = Vec::with_capacity(n);
        for i in 0..n {
            let s = guard.samples[(guard.pos + i) % n];
            amplitudes.push(sample_to_byte(s));
        }
        SampleFrame { amplitudes }
    }

    /// Clear the window back to zero signal
    pub fn reset(&self) {
        let mut guard = self.ring.lock();
        guard.samples.fill(0.0);
        guard.pos = 0;
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an f32 sample in [-1, 1] to an unsigned byte centered at 128
#[inline]
fn sample_to_byte(s: f32) -> u8 {
    (128.0 + s * 128.0).clamp(0.0, 255.0) as u8
}
