use crate::port::PortError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mock operations.
pub type MockResult<T> = Result<T, MockError>;

/// Errors surfaced by the supervisor and the read loop.
///
/// Failing to kill a stale bridge has no variant: it is only logged.
#[derive(Debug, Error)]
pub enum MockError {
    /// The bridge executable could not be started.
    #[error("failed to spawn bridge '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PID file could not be written.
    #[error("failed to write PID file '{path}': {source}")]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output device never appeared after the bridge was started.
    #[error("device '{path}' not ready after {attempts} attempts: {source}")]
    DeviceNotReady {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// The open callback failed.
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: PortError,
    },

    /// Reading from the port failed; the read loop has stopped.
    #[error("read failed: {0}")]
    Read(#[source] PortError),

    /// Writing to the port failed.
    #[error("write failed: {0}")]
    Write(#[source] PortError),

    /// `write` was called before `read` opened the port.
    #[error("port is not open")]
    PortNotOpen,

    /// Signalling the bridge process failed.
    #[error("failed to signal bridge pid={pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}

impl MockError {
    /// The port error behind a failed open, read or write.
    pub fn port_error(&self) -> Option<&PortError> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Read(source) | Self::Write(source) => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_port_not_open_display() {
        assert_eq!(MockError::PortNotOpen.to_string(), "port is not open");
    }

    #[test]
    fn test_port_error_access() {
        let err = MockError::Read(PortError::Io(io::Error::from(io::ErrorKind::BrokenPipe)));
        assert_eq!(
            err.port_error().and_then(PortError::io_kind),
            Some(io::ErrorKind::BrokenPipe)
        );
        assert!(MockError::PortNotOpen.port_error().is_none());
    }

    #[test]
    fn test_device_not_ready_display() {
        let err = MockError::DeviceNotReady {
            path: PathBuf::from("ttyOUT"),
            attempts: 10,
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let message = err.to_string();
        assert!(message.contains("ttyOUT"));
        assert!(message.contains("10 attempts"));
    }
}
