//! Microphone capture session
//!
//! A session owns the hardware input stream and the analyser it feeds;
//! both are released together by `stop()`. cpal streams are not `Send`,
//! so the stream lives on a dedicated audio thread that parks until the
//! session is stopped. At most one session is active per application —
//! enforcement lives in [`crate::session::SessionController`].

use cpal::traits::{DeviceTrait, StreamTrait};
use crossbeam_channel::{bounded, Sender};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::audio::analyser::Analyser;
use crate::audio::device;
use crate::error::Error;

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No stream open
    Idle,
    /// Stream open and feeding the analyser
    Active,
}

/// An open microphone-to-analyser lifecycle unit
///
/// Created by `start`, destroyed by `stop` or drop. The liveness flag is
/// shared with the sampler task: it is cleared before any resource is
/// released, so a tick racing a stop observes it and reads nothing.
pub struct CaptureSession {
    device_id: Option<String>,
    analyser: Arc<Analyser>,
    live: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
    stop_tx: Option<Sender<()>>,
    audio_thread: Option<JoinHandle<()>>,
}

impl CaptureSession {
    /// Open a capture stream and transition to Active
    ///
    /// `device_id` of `Some` requests exactly that device; `None` requests
    /// the platform default. On permission or hardware error no session is
    /// created and the error is returned to the caller — no retry.
    pub fn start(device_id: Option<&str>) -> crate::Result<Self> {
        let device = device::find_device(device_id)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let analyser = Arc::new(Analyser::new());
        let live = Arc::new(AtomicBool::new(true));
        let failed = Arc::new(AtomicBool::new(false));

        // The stream must be built, played and dropped on one thread.
        // `ready_rx` reports whether the open succeeded before `start`
        // returns; `stop_rx` parks the thread until release.
        let (ready_tx, ready_rx) = bounded::<Result<(), String>>(1);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let analyser_for_stream = analyser.clone();
        let failed_for_stream = failed.clone();
        let audio_thread = std::thread::spawn(move || {
            let stream =
                match build_input_stream(&device, analyser_for_stream, failed_for_stream) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(format!("failed to start input stream: {e}")));
                return;
            }

            let _ = ready_tx.send(Ok(()));

            // Park until stop; dropping the stream releases the hardware.
            let _ = stop_rx.recv();
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = audio_thread.join();
                return Err(Error::Capture(e));
            }
            Err(_) => {
                let _ = audio_thread.join();
                return Err(Error::Capture(
                    "audio thread exited before the stream opened".to_string(),
                ));
            }
        }

        tracing::info!(device = %device_name, "Capture session active");

        Ok(Self {
            device_id: device_id.map(str::to_owned),
            analyser,
            live,
            failed,
            stop_tx: Some(stop_tx),
            audio_thread: Some(audio_thread),
        })
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        if self.is_active() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    /// Whether the hardware stream is still held
    pub fn is_active(&self) -> bool {
        self.audio_thread.is_some()
    }

    /// Device id the session was started with (`None` = platform default)
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// Analysis handle fed by this session's stream
    pub fn analyser(&self) -> Arc<Analyser> {
        self.analyser.clone()
    }

    /// Liveness flag checked by the sampler before every read
    pub fn liveness(&self) -> Arc<AtomicBool> {
        self.live.clone()
    }

    /// Flag tripped by the stream error callback on mid-stream failure
    pub fn failure_flag(&self) -> Arc<AtomicBool> {
        self.failed.clone()
    }

    /// Release the hardware stream and the analyser feed
    ///
    /// Idempotent: stopping an already-stopped session is a no-op and the
    /// release runs at most once.
    pub fn stop(&mut self) {
        // Clear liveness first so an in-flight sampler tick reads nothing.
        self.live.store(false, Ordering::SeqCst);

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
            self.analyser.reset();
            tracing::debug!("Capture stream released");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build an f32 input stream that feeds the analyser
fn build_input_stream(
    device: &cpal::Device,
    analyser: Arc<Analyser>,
    failed: Arc<AtomicBool>,
) -> crate::Result<cpal::Stream> {
    let default_config = device
        .default_input_config()
        .map_err(|e| Error::Capture(format!("failed to get default input config: {e}")))?;

    let channels = default_config.channels();
    let stream_config = cpal::StreamConfig {
        channels,
        sample_rate: default_config.sample_rate(),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                if channels > 1 {
                    analyser.push_samples(&to_mono(data, channels));
                } else {
                    analyser.push_samples(data);
                }
            },
            move |err| {
                tracing::error!("Audio input stream error: {}", err);
                failed.store(true, Ordering::SeqCst);
            },
            None,
        )
        .map_err(|e| Error::Capture(format!("failed to build input stream: {e}")))?;

    Ok(stream)
}

/// Down-mix interleaved multi-channel audio to mono by averaging channels
fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    let ch = channels as usize;
    samples
        .chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}
