//! `serialport`-backed [`Port`] used when the caller supplies no opener.

use super::error::PortError;
use super::traits::Port;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

/// How long a single `serialport` read waits before it is retried.
const POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// A device opened through the `serialport` crate.
///
/// `serialport` reads always carry a timeout. `read_bytes` retries on
/// timeout so the device behaves as a plain blocking reader.
pub struct SerialDevice {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl SerialDevice {
    /// Open `path` at `baud_rate`, 8N1 with no flow control.
    ///
    /// # Example
    /// ```no_run
    /// use mock_serialport::port::SerialDevice;
    ///
    /// let port = SerialDevice::open("ttyOUT".as_ref(), 57600)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(path: &Path, baud_rate: u32) -> Result<Self, PortError> {
        let name = path.to_string_lossy().into_owned();
        let port = serialport::new(name.as_str(), baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .flow_control(serialport::FlowControl::None)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(POLL_TIMEOUT)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(name.as_str()),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self { port, name })
    }

    /// Open `path` and box it, matching the shape of [`crate::OpenFn`].
    pub fn open_boxed(path: &Path, baud_rate: u32) -> Result<Box<dyn Port>, PortError> {
        Ok(Box::new(Self::open(path, baud_rate)?))
    }

    /// The path this device was opened from.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Port for SerialDevice {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        loop {
            match self.port.read(buffer) {
                Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::Interrupted => {
                    continue
                }
                other => return other.map_err(PortError::Io),
            }
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.port.write(data).map_err(PortError::Io)
    }
}

impl std::fmt::Debug for SerialDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialDevice")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate().ok())
            .finish()
    }
}
