//! Shared test utilities.
//!
//! - A fake bridge executable so lifecycle tests run without socat
//! - A channel-backed port whose reads block like a real device
//! - Polling helpers for process state

#![allow(dead_code)]

use mock_serialport::port::{Port, PortError};
use mock_serialport::BridgeConfig;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Writes its arguments to `{ARGS}`, creates every `link=` path, then sleeps.
const FAKE_SOCAT: &str = r#"#!/bin/sh
printf '%s\n' "$@" > '{ARGS}'
for spec in "$@"; do
  link=$(printf '%s' "$spec" | sed -n 's/.*link=\([^,]*\).*/\1/p')
  if [ -n "$link" ]; then
    : > "$link"
  fi
done
exec sleep 30
"#;

/// Starts and sleeps without ever creating a device.
const SILENT_SOCAT: &str = "#!/bin/sh\nexec sleep 30\n";

/// A scratch directory holding a fake bridge script and the device paths.
pub struct FakeBridge {
    pub dir: TempDir,
    pub script: PathBuf,
    pub args_log: PathBuf,
}

impl FakeBridge {
    /// A bridge that creates both devices as plain files.
    pub fn new() -> Self {
        Self::with_script(FAKE_SOCAT)
    }

    /// A bridge that never creates the devices.
    pub fn silent() -> Self {
        Self::with_script(SILENT_SOCAT)
    }

    fn with_script(template: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let script = dir.path().join("fake-socat");
        let args_log = dir.path().join("args.log");
        let body = template.replace("{ARGS}", &args_log.to_string_lossy());
        fs::write(&script, body).expect("Failed to write fake bridge");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
                .expect("Failed to make fake bridge executable");
        }

        Self {
            dir,
            script,
            args_log,
        }
    }

    /// Bridge settings pointing every path into the scratch directory.
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            input_file: self.dir.path().join("ttyIN"),
            output_file: self.dir.path().join("ttyOUT"),
            pid_file: Some(self.pid_file()),
            socat_path: Some(self.script.clone()),
            baud_rate: 57600,
            ..Default::default()
        }
    }

    pub fn pid_file(&self) -> PathBuf {
        self.dir.path().join("socat.pid")
    }

    /// The PID currently recorded in the PID file.
    pub fn recorded_pid(&self) -> Option<u32> {
        fs::read_to_string(self.pid_file()).ok()?.parse().ok()
    }

    /// Arguments the most recent fake bridge was started with.
    pub fn recorded_args(&self) -> Vec<String> {
        fs::read_to_string(&self.args_log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Poll `condition` every 10ms until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// Whether a process with this PID still exists (zombies included).
#[cfg(unix)]
pub fn process_exists(pid: u32) -> bool {
    // SAFETY: signal 0 only checks for existence and permission.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

/// SIGKILL a stray bridge left behind by a test.
#[cfg(unix)]
pub fn kill(pid: u32) {
    // SAFETY: kill(2) only takes integers; pid is a child this test spawned.
    unsafe {
        libc::kill(pid as libc::pid_t, libc::SIGKILL);
    }
}

/// Port whose reads block on a channel, like a device waiting for input.
///
/// Dropping the [`ChannelPortHandle`] ends the stream with a zero-length read.
pub struct ChannelPort {
    incoming: Receiver<Vec<u8>>,
    outgoing: Sender<Vec<u8>>,
    leftover: Vec<u8>,
}

/// The test's side of a [`ChannelPort`].
pub struct ChannelPortHandle {
    pub to_mock: Sender<Vec<u8>>,
    pub from_mock: Receiver<Vec<u8>>,
}

impl ChannelPortHandle {
    /// Collect replies until `expected_len` bytes arrived or `timeout` passed.
    pub fn receive(&self, expected_len: usize, timeout: Duration) -> Vec<u8> {
        let deadline = Instant::now() + timeout;
        let mut received = Vec::new();
        while received.len() < expected_len {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.from_mock.recv_timeout(remaining) {
                Ok(chunk) => received.extend(chunk),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        received
    }
}

pub fn channel_port() -> (ChannelPort, ChannelPortHandle) {
    let (to_mock, incoming) = mpsc::channel();
    let (outgoing, from_mock) = mpsc::channel();
    (
        ChannelPort {
            incoming,
            outgoing,
            leftover: Vec::new(),
        },
        ChannelPortHandle { to_mock, from_mock },
    )
}

impl Port for ChannelPort {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        if self.leftover.is_empty() {
            match self.incoming.recv() {
                Ok(chunk) => self.leftover = chunk,
                Err(_) => return Ok(0),
            }
        }
        let n = self.leftover.len().min(buffer.len());
        buffer[..n].copy_from_slice(&self.leftover[..n]);
        self.leftover.drain(..n);
        Ok(n)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.outgoing
            .send(data.to_vec())
            .map_err(|_| PortError::Io(std::io::ErrorKind::BrokenPipe.into()))?;
        Ok(data.len())
    }
}
