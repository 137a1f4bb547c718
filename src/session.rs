//! Capture session lifecycle controller
//!
//! Holds the single session slot, spawns the sampler task bound to each
//! session, and broadcasts status/frame traffic to the UI layer.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::audio::capture::{CaptureSession, SessionState};
use crate::audio::sampler::{run_sampler, SamplerExit};
use crate::constants::CONTROL_CHANNEL_CAPACITY;
use crate::error::Error;
use crate::protocol::{ControlMessage, SessionStatus};

/// Owner of the (at most one) active capture session
pub struct SessionController {
    /// The session slot; `None` or a stopped session both mean Idle
    session: Mutex<Option<CaptureSession>>,

    /// Fan-out channel for status, errors and per-tick frames
    control_tx: broadcast::Sender<ControlMessage>,

    /// Sampler tick interval
    tick_interval: Duration,
}

impl SessionController {
    /// Create a controller with the given sampler tick interval
    pub fn new(tick_interval: Duration) -> Arc<Self> {
        let (control_tx, _) = broadcast::channel(CONTROL_CHANNEL_CAPACITY);

        Arc::new(Self {
            session: Mutex::new(None),
            control_tx,
            tick_interval,
        })
    }

    /// Subscribe to control/frame traffic
    pub fn subscribe(&self) -> broadcast::Receiver<ControlMessage> {
        self.control_tx.subscribe()
    }

    /// Sender half of the control channel
    pub fn sender(&self) -> broadcast::Sender<ControlMessage> {
        self.control_tx.clone()
    }

    /// Start a capture session and its sampler task
    ///
    /// Starting while a session is active is rejected with
    /// [`Error::SessionActive`]; the caller must stop first. The sampler
    /// runs until the session stops; on a mid-stream failure it stops the
    /// session and reports the error to subscribers.
    pub fn start(self: &Arc<Self>, device_id: Option<&str>) -> crate::Result<()> {
        let mut slot = self.session.lock();
        if slot.as_ref().map(|s| s.is_active()).unwrap_or(false) {
            return Err(Error::SessionActive);
        }

        let session = CaptureSession::start(device_id)?;
        let analyser = session.analyser();
        let live = session.liveness();
        let failed = session.failure_flag();
        *slot = Some(session);
        drop(slot);

        let controller = Arc::clone(self);
        let tx = self.control_tx.clone();
        let tick_interval = self.tick_interval;
        tokio::spawn(async move {
            let exit = run_sampler(analyser, live, failed, tx.clone(), tick_interval).await;
            if exit == SamplerExit::Failed {
                tracing::warn!("Input stream failed mid-capture, stopping session");
                controller.stop();
                let _ = tx.send(ControlMessage::Error {
                    message: "input stream failed, capture stopped".to_string(),
                });
            }
        });

        let _ = self.control_tx.send(ControlMessage::Status(self.status()));
        Ok(())
    }

    /// Stop the active session
    ///
    /// No-op when already idle; safe to call from teardown paths.
    pub fn stop(&self) {
        let stopped = {
            let mut slot = self.session.lock();
            match slot.take() {
                Some(mut session) => {
                    session.stop();
                    true
                }
                None => false,
            }
        };

        if stopped {
            tracing::info!("Capture session stopped");
            let _ = self.control_tx.send(ControlMessage::Status(self.status()));
        }
    }

    /// Whether a session is currently active
    pub fn is_active(&self) -> bool {
        self.session
            .lock()
            .as_ref()
            .map(|s| s.is_active())
            .unwrap_or(false)
    }

    /// Current status for the UI
    pub fn status(&self) -> SessionStatus {
        let slot = self.session.lock();
        match slot.as_ref() {
            Some(session) if session.is_active() => SessionStatus {
                state: SessionState::Active,
                device_id: session.device_id().map(str::to_owned),
            },
            _ => SessionStatus {
                state: SessionState::Idle,
                device_id: None,
            },
        }
    }
}
