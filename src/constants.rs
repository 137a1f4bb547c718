//! Shared constants

/// Samples per analysis window (time-domain buffer size)
pub const ANALYSIS_WINDOW: usize = 2048;

/// Byte value representing zero signal in a time-domain frame
pub const ZERO_SIGNAL: u8 = 128;

/// Oscilloscope canvas width in logical units
pub const SCOPE_WIDTH: f32 = 800.0;

/// Oscilloscope canvas height in logical units
pub const SCOPE_HEIGHT: f32 = 160.0;

/// Sampler tick interval in milliseconds (~one display refresh)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

/// Default HTTP port for the web UI
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Capacity of the control/frame broadcast channel
pub const CONTROL_CHANNEL_CAPACITY: usize = 256;
