//! Error types

use thiserror::Error;

/// Top-level error type for the library
#[derive(Debug, Error)]
pub enum Error {
    /// Device enumeration or lookup failed
    #[error("audio device error: {0}")]
    Device(String),

    /// Opening or running the capture stream failed
    #[error("capture error: {0}")]
    Capture(String),

    /// A start was requested while a session is already active
    #[error("a capture session is already active")]
    SessionActive,

    /// Configuration parse/serialize error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;
