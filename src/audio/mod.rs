//! Audio subsystem
//!
//! Contains the input device directory, the capture session and its
//! analyser, and the per-tick level sampler.

pub mod analyser;
pub mod capture;
pub mod device;
pub mod sampler;

pub use analyser::{Analyser, SampleFrame};
pub use capture::{CaptureSession, SessionState};
pub use device::{default_selection, find_device, list_input_devices, AudioInputDevice};
pub use sampler::{run_sampler, volume_percent, waveform_points, SamplerExit};
