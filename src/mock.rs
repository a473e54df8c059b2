//! The read/process loop and its owner, [`Mock`].

use crate::error::{MockError, MockResult};
use crate::options::Options;
use crate::port::Port;
use crate::supervisor::Supervisor;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Size of the buffer each read fills.
pub const READ_BUFFER_SIZE: usize = 100;

/// One end of a socat pty pair, driven by caller-supplied callbacks.
///
/// Typical use runs [`Mock::start`] (or [`Mock::read`] after
/// [`Mock::start_socat`]) on its own thread, since the read loop blocks for
/// as long as the bridge is alive. Keep a [`Supervisor`] clone to stop it.
///
/// ```no_run
/// use mock_serialport::{BridgeConfig, Mock, Options};
///
/// let options = Options::new(BridgeConfig {
///     baud_rate: 57600,
///     ..Default::default()
/// })
/// .with_process(|mock, input| {
///     if input == b"hello" {
///         let _ = mock.write(b"world");
///     }
///     Vec::new()
/// });
///
/// let mut mock = Mock::new(options);
/// let supervisor = mock.supervisor();
/// let reader = std::thread::spawn(move || mock.start());
/// // ... talk to ttyIN ...
/// supervisor.terminate()?;
/// # let _ = reader;
/// # Ok::<(), mock_serialport::MockError>(())
/// ```
pub struct Mock {
    options: Arc<Options>,
    port: Option<Box<dyn Port>>,
    supervisor: Supervisor,
}

impl Mock {
    pub fn new(options: impl Into<Arc<Options>>) -> Self {
        let options = options.into();
        Self {
            supervisor: Supervisor::new(Arc::clone(&options)),
            options,
            port: None,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// A handle on the bridge process that can be moved to another thread.
    pub fn supervisor(&self) -> Supervisor {
        self.supervisor.clone()
    }

    /// Whether [`Mock::read`] has opened the output device.
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Start the bridge, wait for the output device, then run the read loop.
    ///
    /// Returns when the read loop ends.
    pub fn start(&mut self) -> MockResult<()> {
        self.start_socat()?;
        self.wait_for_device()?;
        self.read()
    }

    /// See [`Supervisor::start_socat`].
    pub fn start_socat(&self) -> MockResult<u32> {
        self.supervisor.start_socat()
    }

    /// See [`Supervisor::wait_for_device`].
    pub fn wait_for_device(&self) -> MockResult<()> {
        self.supervisor.wait_for_device()
    }

    /// Release the port and terminate the bridge. See [`Supervisor::terminate`].
    pub fn terminate(&mut self) -> MockResult<()> {
        self.port = None;
        self.supervisor.terminate()
    }

    /// Open the output device and process incoming bytes until the stream ends.
    ///
    /// A zero-length read ends the loop with `Ok(())`; a read error ends it
    /// with [`MockError::Read`]. Without a process callback the bytes are only
    /// logged. With one, they are appended to a pending buffer that is handed
    /// to the callback, and the callback's return value becomes the new
    /// pending buffer.
    pub fn read(&mut self) -> MockResult<()> {
        let options = Arc::clone(&self.options);
        let bridge = &options.bridge;
        let verbose = bridge.verbose;

        let port = (options.open)(bridge.output_file.as_path(), bridge.baud_rate).map_err(|source| {
            if verbose {
                warn!(path = %bridge.output_file.display(), error = %source, "failed to open device");
            }
            MockError::Open {
                path: bridge.output_file.clone(),
                source,
            }
        })?;
        self.port = Some(port);
        if verbose {
            info!(path = %bridge.output_file.display(), "reading data");
        }

        let mut buffer = [0u8; READ_BUFFER_SIZE];
        let mut pending = Vec::new();
        loop {
            // Process may have called terminate, which releases the port.
            let Some(port) = self.port.as_mut() else {
                return Ok(());
            };
            let n = match port.read_bytes(&mut buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(source) => {
                    if verbose {
                        warn!(error = %source, "read failed");
                    }
                    return Err(MockError::Read(source));
                }
            };
            let received = &buffer[..n];

            match &options.process {
                None => {
                    if verbose {
                        info!("<= received {}", HexBytes(received));
                    }
                }
                Some(process) => {
                    pending.extend_from_slice(received);
                    pending = process(self, std::mem::take(&mut pending));
                }
            }
        }
    }

    /// Send `data` to the program under test in a single port write.
    pub fn write(&mut self, data: &[u8]) -> MockResult<()> {
        let verbose = self.options.bridge.verbose;
        let port = self.port.as_mut().ok_or(MockError::PortNotOpen)?;

        if let Err(source) = port.write_bytes(data) {
            if verbose {
                warn!(error = %source, "write failed");
            }
            return Err(MockError::Write(source));
        }
        if verbose {
            info!("=> sent     {}", HexBytes(data));
        }
        Ok(())
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("options", &self.options)
            .field("open", &self.is_open())
            .field("supervisor", &self.supervisor)
            .finish()
    }
}

/// Space-separated upper-case hex, e.g. `68 65 6C 6C 6F`.
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
