//! Control protocol for the web UI
//!
//! Tagged JSON messages exchanged over the WebSocket. Frames flow
//! server -> client once per sampler tick while a session is active;
//! everything else is request/response style control traffic.

use serde::{Deserialize, Serialize};

use crate::audio::capture::SessionState;
use crate::audio::device::AudioInputDevice;

/// Response for the device list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesResponse {
    pub devices: Vec<AudioInputDevice>,
    /// Id of the device the UI should preselect (first of the list)
    pub default_id: Option<String>,
}

impl DevicesResponse {
    /// Build a response from an enumerated device list
    pub fn new(devices: Vec<AudioInputDevice>) -> Self {
        let default_id = devices.first().map(|d| d.id.clone());
        Self {
            devices,
            default_id,
        }
    }
}

/// Current session status for the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Session state (Idle or Active)
    pub state: SessionState,

    /// Device id the active session was started with, if any
    pub device_id: Option<String>,
}

/// One sampler tick's output: the waveform polyline plus the volume level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformFrame {
    /// Polyline vertices in canvas coordinates, closing stroke included
    pub points: Vec<(f32, f32)>,

    /// Volume percentage in [0, 100]
    pub volume: f32,
}

/// Control message types for WebSocket communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ControlMessage {
    /// Start capturing from the given device (platform default when unset)
    Start { device_id: Option<String> },

    /// Stop the active capture session
    Stop,

    /// Get session status
    GetStatus,

    /// Status response
    Status(SessionStatus),

    /// List available audio input devices
    ListDevices,

    /// Device list response
    Devices(DevicesResponse),

    /// Per-tick waveform and volume update
    Frame(WaveformFrame),

    /// Error response
    Error { message: String },

    /// Ping for keepalive
    Ping,

    /// Pong response
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_round_trip() {
        let msg = ControlMessage::Start {
            device_id: Some("Internal Microphone".to_string()),
        };

        let json = serde_json::to_string(&msg).unwrap();
        let parsed: ControlMessage = serde_json::from_str(&json).unwrap();

        match parsed {
            ControlMessage::Start { device_id } => {
                assert_eq!(device_id.as_deref(), Some("Internal Microphone"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_frame_round_trip() {
        let msg = ControlMessage::Frame(WaveformFrame {
            points: vec![(0.0, 80.0), (400.0, 120.0), (800.0, 80.0)],
            volume: 42.5,
        });

        let json = serde_json::to_string(&msg).unwrap();
        let parsed: ControlMessage = serde_json::from_str(&json).unwrap();

        match parsed {
            ControlMessage::Frame(frame) => {
                assert_eq!(frame.points.len(), 3);
                assert_eq!(frame.points[2], (800.0, 80.0));
                assert_eq!(frame.volume, 42.5);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_devices_default_is_first() {
        let resp = DevicesResponse::new(vec![
            AudioInputDevice {
                id: "mic-a".to_string(),
                label: "Mic A".to_string(),
            },
            AudioInputDevice {
                id: "mic-b".to_string(),
                label: "Mic B".to_string(),
            },
        ]);
        assert_eq!(resp.default_id.as_deref(), Some("mic-a"));

        let empty = DevicesResponse::new(Vec::new());
        assert!(empty.default_id.is_none());
    }

    #[test]
    fn test_unit_variant_tagging() {
        let json = serde_json::to_string(&ControlMessage::Ping).unwrap();
        assert_eq!(json, r#"{"type":"Ping"}"#);

        let parsed: ControlMessage = serde_json::from_str(r#"{"type":"Stop"}"#).unwrap();
        assert!(matches!(parsed, ControlMessage::Stop));
    }
}
