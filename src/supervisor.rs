//! Lifecycle of the socat bridge process.
//!
//! The PID file is the only coordination between independent instances. It
//! is not locked: two supervisors sharing a PID file race and the last writer
//! wins. Restarting kills whatever PID the file names and does not wait for
//! that process to exit before spawning the replacement.

use crate::error::{MockError, MockResult};
use crate::options::Options;
use crate::signal::{self, Signal};
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

/// Handle on the bridge process.
///
/// Cheap to clone; clones share the process slot, so a clone taken before the
/// read loop starts can terminate the bridge from another thread.
#[derive(Clone)]
pub struct Supervisor {
    options: Arc<Options>,
    bridge: Arc<Mutex<Option<Child>>>,
}

impl Supervisor {
    pub fn new(options: Arc<Options>) -> Self {
        Self {
            options,
            bridge: Arc::new(Mutex::new(None)),
        }
    }

    /// Kill any bridge recorded in the PID file, spawn a new one and record it.
    ///
    /// Returns the new bridge's PID. Does not wait for the devices to appear;
    /// see [`Supervisor::wait_for_device`].
    pub fn start_socat(&self) -> MockResult<u32> {
        let bridge = &self.options.bridge;
        let verbose = bridge.verbose;

        let _ = fs::remove_file(&bridge.output_file);

        if let Some(pid) = read_pid_file(bridge.pid_file()) {
            match signal::send(pid, Signal::Kill) {
                Ok(()) => {
                    if verbose {
                        info!(pid, "killed stale bridge");
                    }
                }
                Err(e) if signal::is_no_such_process(&e) => {}
                Err(e) => {
                    if verbose {
                        warn!(pid, error = %e, "failed to kill stale bridge");
                    }
                }
            }
        }

        let program = bridge.socat_path();
        let args = bridge.socat_command_args();
        if verbose {
            info!(program = %program.display(), ?args, "starting bridge");
        }

        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| {
                if verbose {
                    error!(program = %program.display(), error = %source, "failed to spawn bridge");
                }
                MockError::Spawn {
                    program: program.to_path_buf(),
                    source,
                }
            })?;

        let pid = child.id();
        if let Some(previous) = self.bridge.lock().replace(child) {
            reap(previous);
        }
        if verbose {
            info!(pid, "started bridge");
        }

        let pid_file = bridge.pid_file();
        write_pid_file(pid_file, pid).map_err(|source| MockError::PidFile {
            path: pid_file.to_path_buf(),
            source,
        })?;

        Ok(pid)
    }

    /// Poll until the output device exists.
    ///
    /// Fails with the last stat error once the configured attempts run out.
    pub fn wait_for_device(&self) -> MockResult<()> {
        let bridge = &self.options.bridge;
        let attempts = bridge.device_poll_attempts.max(1);

        let mut last_error = None;
        for _ in 0..attempts {
            match fs::metadata(&bridge.output_file) {
                Ok(_) => return Ok(()),
                Err(e) => last_error = Some(e),
            }
            thread::sleep(bridge.device_poll_interval());
        }

        Err(MockError::DeviceNotReady {
            path: bridge.output_file.clone(),
            attempts,
            source: last_error.unwrap_or_else(|| io::Error::from(io::ErrorKind::NotFound)),
        })
    }

    /// Remove the PID file and send SIGTERM to the held bridge, if any.
    ///
    /// A bridge that has already exited is not signalled, since its PID may
    /// have been reused. The PID file is removed even when signalling fails or
    /// no bridge is held.
    pub fn terminate(&self) -> MockResult<()> {
        let bridge = &self.options.bridge;
        let child = self.bridge.lock().take();

        let result = match child {
            None => Ok(()),
            Some(mut child) => {
                let pid = child.id();
                let sent = match child.try_wait() {
                    Ok(Some(status)) => {
                        if bridge.verbose {
                            info!(pid, %status, "bridge already exited");
                        }
                        Ok(())
                    }
                    Ok(None) => signal::send(pid, Signal::Terminate),
                    Err(e) => Err(e),
                };
                reap(child);
                match sent {
                    Ok(()) => {
                        if bridge.verbose {
                            info!(pid, "terminated bridge");
                        }
                        Ok(())
                    }
                    Err(source) => {
                        if bridge.verbose {
                            warn!(pid, error = %source, "failed to terminate bridge");
                        }
                        Err(MockError::Signal { pid, source })
                    }
                }
            }
        };

        let _ = fs::remove_file(bridge.pid_file());
        result
    }

    /// PID of the held bridge.
    pub fn pid(&self) -> Option<u32> {
        self.bridge.lock().as_ref().map(Child::id)
    }

    /// Exit status of the held bridge without blocking.
    ///
    /// `Ok(None)` when no bridge is held or it is still running.
    pub fn try_wait(&self) -> io::Result<Option<ExitStatus>> {
        match self.bridge.lock().as_mut() {
            Some(child) => child.try_wait(),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("pid", &self.pid())
            .field("pid_file", &self.options.bridge.pid_file())
            .finish()
    }
}

/// Parse a positive PID out of `path`; anything else means no stale bridge.
fn read_pid_file(path: &Path) -> Option<u32> {
    let contents = fs::read_to_string(path).ok()?;
    match contents.trim().parse::<i64>() {
        Ok(pid) if pid > 0 => u32::try_from(pid).ok(),
        _ => None,
    }
}

fn write_pid_file(path: &Path, pid: u32) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }
    let mut file = options.open(path)?;
    file.write_all(pid.to_string().as_bytes())
}

/// Collect the exit status of a released bridge in the background.
fn reap(mut child: Child) {
    let _ = thread::Builder::new()
        .name("bridge-reaper".into())
        .spawn(move || {
            let _ = child.wait();
        });
}
