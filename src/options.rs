//! Bridge configuration plus the two caller-supplied callbacks.

use crate::config::BridgeConfig;
use crate::mock::Mock;
use crate::port::{Port, PortError, SerialDevice};
use std::path::Path;

/// Opens the output device: `(path, baud_rate) -> Port`.
pub type OpenFn = Box<dyn Fn(&Path, u32) -> Result<Box<dyn Port>, PortError> + Send + Sync>;

/// Handles accumulated input and returns the bytes it did not consume.
///
/// Receives the buffer by value; whatever is returned is kept and extended
/// by the next read. May reply through [`Mock::write`].
pub type ProcessFn = Box<dyn Fn(&mut Mock, Vec<u8>) -> Vec<u8> + Send + Sync>;

/// Everything a [`Mock`] needs. Read-only once handed to [`Mock::new`].
pub struct Options {
    pub bridge: BridgeConfig,
    pub open: OpenFn,
    /// `None` means received bytes are only logged.
    pub process: Option<ProcessFn>,
}

impl Options {
    /// Options that open the output device with [`SerialDevice`] and only log traffic.
    pub fn new(bridge: BridgeConfig) -> Self {
        Self {
            bridge,
            open: Box::new(SerialDevice::open_boxed),
            process: None,
        }
    }

    /// Replace the open callback.
    pub fn with_open<F>(mut self, open: F) -> Self
    where
        F: Fn(&Path, u32) -> Result<Box<dyn Port>, PortError> + Send + Sync + 'static,
    {
        self.open = Box::new(open);
        self
    }

    /// Install a process callback.
    pub fn with_process<F>(mut self, process: F) -> Self
    where
        F: Fn(&mut Mock, Vec<u8>) -> Vec<u8> + Send + Sync + 'static,
    {
        self.process = Some(Box::new(process));
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("bridge", &self.bridge)
            .field("process", &self.process.is_some())
            .finish_non_exhaustive()
    }
}
