//! Port-specific error types.
//!
//! Kept separate from [`crate::MockError`] so that caller-supplied `Port`
//! implementations and open callbacks only need to speak this one type.

use thiserror::Error;

/// Errors raised by a [`Port`](super::Port) or by the callback that opens one.
#[derive(Debug, Error)]
pub enum PortError {
    /// The device path does not exist.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// The device exists but rejected the requested settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The underlying I/O error kind, if this error carries one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}
