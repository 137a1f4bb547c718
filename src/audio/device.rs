//! Input device directory

use cpal::traits::{DeviceTrait, HostTrait};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An audio input endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInputDevice {
    /// Opaque device identifier (the cpal device name)
    pub id: String,

    /// Human-readable label; may be empty before permissions are granted
    pub label: String,
}

/// List available input devices
///
/// Enumeration failures are swallowed: the caller gets an empty (or
/// partial) list and the rest of the UI keeps working.
pub fn list_input_devices() -> Vec<AudioInputDevice> {
    let host = cpal::default_host();

    let devices = match host.input_devices() {
        Ok(devices) => devices,
        Err(e) => {
            tracing::debug!("Input device enumeration failed: {}", e);
            return Vec::new();
        }
    };

    devices
        .filter_map(|device| match device.name() {
            Ok(name) => Some(AudioInputDevice {
                id: name.clone(),
                label: name,
            }),
            Err(e) => {
                tracing::debug!("Skipping input device without a name: {}", e);
                None
            }
        })
        .collect()
}

/// Default selection for a freshly enumerated list: the first device
pub fn default_selection(devices: &[AudioInputDevice]) -> Option<&AudioInputDevice> {
    devices.first()
}

/// Resolve a device id to a cpal device
///
/// A `Some(id)` must match a device name exactly; `None` requests the
/// platform default input.
pub fn find_device(device_id: Option<&str>) -> crate::Result<cpal::Device> {
    let host = cpal::default_host();

    match device_id {
        Some(id) => host
            .input_devices()
            .map_err(|e| Error::Device(format!("failed to enumerate input devices: {e}")))?
            .find(|d| d.name().map(|n| n == id).unwrap_or(false))
            .ok_or_else(|| Error::Device(format!("input device not found: {id}"))),
        None => host
            .default_input_device()
            .ok_or_else(|| Error::Device("no default input device available".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str) -> AudioInputDevice {
        AudioInputDevice {
            id: id.to_string(),
            label: id.to_string(),
        }
    }

    #[test]
    fn test_default_selection_is_first() {
        let devices = vec![device("mic-a"), device("mic-b"), device("mic-c")];
        assert_eq!(default_selection(&devices), Some(&devices[0]));
    }

    #[test]
    fn test_default_selection_empty() {
        assert_eq!(default_selection(&[]), None);
    }

    #[test]
    fn test_label_may_be_empty() {
        // Pre-permission labels come back empty; the id still identifies
        // the endpoint.
        let d = AudioInputDevice {
            id: "hw:0,0".to_string(),
            label: String::new(),
        };
        assert!(d.label.is_empty());
        assert!(!d.id.is_empty());
    }
}
