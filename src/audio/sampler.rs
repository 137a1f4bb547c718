//! Per-tick level sampler
//!
//! Runs once per display tick while a session is live: reads one
//! time-domain frame from the analyser, derives the oscilloscope polyline
//! and the volume percentage, and broadcasts them to the UI. The loop is
//! bound to the session through its liveness flag and self-cancels — it
//! never schedules another read after the session leaves Active.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::audio::analyser::{Analyser, SampleFrame};
use crate::constants::{SCOPE_HEIGHT, SCOPE_WIDTH, ZERO_SIGNAL};
use crate::protocol::{ControlMessage, WaveformFrame};

/// Why the sampling loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerExit {
    /// The session was stopped
    Stopped,
    /// The input stream reported a mid-stream failure
    Failed,
}

/// Build the oscilloscope polyline for one frame
///
/// Sample index `i` maps to x = `i * (width / N)` and
/// y = `(amplitude / 128) * height / 2`, so a zero-signal frame draws a
/// flat line at mid-height. A closing vertex at `(width, height / 2)`
/// extends the final segment to the right edge.
pub fn waveform_points(frame: &SampleFrame, width: f32, height: f32) -> Vec<(f32, f32)> {
    let n = frame.len();
    let mut points = Vec::with_capacity(n + 1);

    if n > 0 {
        let slice_width = width / n as f32;
        for (i, &amplitude) in frame.amplitudes.iter().enumerate() {
            let x = i as f32 * slice_width;
            let y = (amplitude as f32 / 128.0) * height / 2.0;
            points.push((x, y));
        }
    }

    // Closing stroke back to mid-height at the right edge.
    points.push((width, height / 2.0));
    points
}

/// Volume percentage for one frame
///
/// Deviation of the mean amplitude byte from the zero-signal midpoint,
/// doubled and clamped to [0, 100]. A crude proxy, not RMS — kept as-is
/// so readings match the canvas trace users have calibrated against.
pub fn volume_percent(frame: &SampleFrame) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }

    let sum: u64 = frame.amplitudes.iter().map(|&b| b as u64).sum();
    let avg = sum as f32 / frame.len() as f32;
    ((avg - ZERO_SIGNAL as f32) * 2.0).clamp(0.0, 100.0)
}

/// Run the sampling loop until the session stops or fails
///
/// Liveness is checked before every read, so a stop racing an in-flight
/// tick results in zero further reads. Broadcast send failures (no
/// subscribers) are ignored; the loop keeps sampling.
pub async fn run_sampler(
    analyser: Arc<Analyser>,
    live: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
    tx: broadcast::Sender<ControlMessage>,
    tick_interval: Duration,
) -> SamplerExit {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if !live.load(Ordering::SeqCst) {
            return SamplerExit::Stopped;
        }
        if failed.load(Ordering::SeqCst) {
            return SamplerExit::Failed;
        }

        let frame = analyser.byte_time_domain();
        let message = ControlMessage::Frame(WaveformFrame {
            points: waveform_points(&frame, SCOPE_WIDTH, SCOPE_HEIGHT),
            volume: volume_percent(&frame),
        });

        let _ = tx.send(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ANALYSIS_WINDOW;
    use proptest::prelude::*;

    fn frame_of(byte: u8, len: usize) -> SampleFrame {
        SampleFrame {
            amplitudes: vec![byte; len],
        }
    }

    #[test]
    fn test_volume_silence_is_zero() {
        assert_eq!(volume_percent(&frame_of(128, ANALYSIS_WINDOW)), 0.0);
    }

    #[test]
    fn test_volume_saturates_high() {
        // (255 - 128) * 2 = 254, clamped to 100.
        assert_eq!(volume_percent(&frame_of(255, ANALYSIS_WINDOW)), 100.0);
        // Anything at or above byte 178 already saturates.
        assert_eq!(volume_percent(&frame_of(192, ANALYSIS_WINDOW)), 100.0);
    }

    #[test]
    fn test_volume_clamps_negative_to_zero() {
        // (0 - 128) * 2 = -256, clamped to 0.
        assert_eq!(volume_percent(&frame_of(0, ANALYSIS_WINDOW)), 0.0);
        assert_eq!(volume_percent(&frame_of(64, ANALYSIS_WINDOW)), 0.0);
    }

    #[test]
    fn test_volume_midrange() {
        // (148 - 128) * 2 = 40.
        assert_eq!(volume_percent(&frame_of(148, ANALYSIS_WINDOW)), 40.0);
    }

    #[test]
    fn test_waveform_geometry() {
        let n = ANALYSIS_WINDOW;
        let points = waveform_points(&frame_of(128, n), 800.0, 160.0);

        assert_eq!(points.len(), n + 1);

        // Zero signal draws a flat line at mid-height.
        assert!(points.iter().all(|&(_, y)| y == 80.0));

        // The last sample lands strictly left of the right edge...
        let (last_x, _) = points[n - 1];
        assert_eq!(last_x, (n as f32 - 1.0) * (800.0 / n as f32));
        assert!(last_x < 800.0);

        // ...and the closing vertex extends the trace to (width, mid).
        assert_eq!(points[n], (800.0, 80.0));
    }

    #[test]
    fn test_waveform_y_scaling() {
        let frame = SampleFrame {
            amplitudes: vec![0, 128, 255],
        };
        let points = waveform_points(&frame, 800.0, 160.0);

        assert_eq!(points[0].1, 0.0);
        assert_eq!(points[1].1, 80.0);
        assert!((points[2].1 - 159.375).abs() < 1e-3);
    }

    #[test]
    fn test_three_tick_scenario() {
        // Buffers all-128, all-192, all-64 across three ticks produce
        // volumes 0, 100 (saturated), 0 (clamped from negative).
        let analyser = Analyser::with_window(ANALYSIS_WINDOW);
        let mut volumes = Vec::new();

        for level in [0.0f32, 0.5, -0.5] {
            analyser.push_samples(&vec![level; ANALYSIS_WINDOW]);
            volumes.push(volume_percent(&analyser.byte_time_domain()));
        }

        assert_eq!(volumes, vec![0.0, 100.0, 0.0]);
    }

    #[tokio::test]
    async fn test_no_reads_after_stop() {
        let analyser = Arc::new(Analyser::new());
        let live = Arc::new(AtomicBool::new(true));
        let failed = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = broadcast::channel(64);

        let handle = tokio::spawn(run_sampler(
            analyser,
            live.clone(),
            failed,
            tx,
            Duration::from_millis(1),
        ));

        // Let at least one tick through, then stop the session.
        let first = rx.recv().await;
        assert!(first.is_ok());
        live.store(false, Ordering::SeqCst);

        let exit = handle.await.unwrap();
        assert_eq!(exit, SamplerExit::Stopped);

        // Drain anything sent before the flag flipped; after that the
        // channel must be closed — the loop is gone, nothing can send.
        loop {
            match rx.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(broadcast::error::TryRecvError::Closed) => break,
                Err(broadcast::error::TryRecvError::Empty) => {
                    panic!("sender still alive after sampler exit")
                }
            }
        }
    }

    #[tokio::test]
    async fn test_failure_flag_ends_loop() {
        let analyser = Arc::new(Analyser::new());
        let live = Arc::new(AtomicBool::new(true));
        let failed = Arc::new(AtomicBool::new(false));
        let (tx, _rx) = broadcast::channel(64);

        let handle = tokio::spawn(run_sampler(
            analyser,
            live,
            failed.clone(),
            tx,
            Duration::from_millis(1),
        ));

        failed.store(true, Ordering::SeqCst);
        let exit = handle.await.unwrap();
        assert_eq!(exit, SamplerExit::Failed);
    }

    proptest! {
        #[test]
        fn prop_volume_always_in_range(bytes in proptest::collection::vec(any::<u8>(), 1..4096)) {
            let frame = SampleFrame { amplitudes: bytes };
            let volume = volume_percent(&frame);
            prop_assert!((0.0..=100.0).contains(&volume));
        }

        #[test]
        fn prop_polyline_closes_at_right_edge(bytes in proptest::collection::vec(any::<u8>(), 1..4096)) {
            let frame = SampleFrame { amplitudes: bytes };
            let points = waveform_points(&frame, 800.0, 160.0);
            prop_assert_eq!(points.len(), frame.len() + 1);
            prop_assert_eq!(*points.last().unwrap(), (800.0, 80.0));
            // All sample vertices stay strictly left of the closing one.
            prop_assert!(points[..frame.len()].iter().all(|&(x, _)| x < 800.0));
        }
    }
}
