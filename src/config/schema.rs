//! Configuration schema definitions.
//!
//! Every section uses `#[serde(default)]`, so a config file only needs the
//! keys it wants to change.

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// PID file used when none is configured.
pub const DEFAULT_PID_FILE: &str = "socat.pid";

/// Bridge executable used when none is configured, resolved through `PATH`.
pub const DEFAULT_SOCAT: &str = "socat";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Virtual port pair and bridge process settings
    pub bridge: BridgeConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject settings the bridge cannot work with.
    ///
    /// The baud rate is passed through to socat unchecked.
    pub fn validate(&self) -> ConfigResult<()> {
        let bridge = &self.bridge;
        if bridge.input_file.as_os_str().is_empty() {
            return Err(ConfigError::validation("bridge.input_file", "must not be empty"));
        }
        if bridge.output_file.as_os_str().is_empty() {
            return Err(ConfigError::validation("bridge.output_file", "must not be empty"));
        }
        if bridge.input_file == bridge.output_file {
            return Err(ConfigError::validation(
                "bridge.output_file",
                "must differ from bridge.input_file",
            ));
        }
        Ok(())
    }
}

/// Settings for the linked pty pair and the socat process behind it.
///
/// The defaults (`ttyIN`, `ttyOUT` in the working directory at 115200 baud)
/// are convenience values so a bare config runs; set real paths for anything
/// shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Device the program under test opens
    pub input_file: PathBuf,
    /// Device the mock opens
    pub output_file: PathBuf,
    /// Where the socat PID is recorded; `socat.pid` when unset
    pub pid_file: Option<PathBuf>,
    /// socat executable; `socat` from `PATH` when unset
    pub socat_path: Option<PathBuf>,
    /// Baud rate for both ends (1200/2400/4800/9600/19200/38400/57600/115200)
    pub baud_rate: u32,
    /// Extra socat address options, appended to both ends
    pub extra_opts: String,
    /// Emit log events for process and traffic activity
    pub verbose: bool,
    /// How many times to check for the output device after spawning socat
    pub device_poll_attempts: u32,
    /// Delay between device checks in milliseconds
    pub device_poll_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("ttyIN"),
            output_file: PathBuf::from("ttyOUT"),
            pid_file: None,
            socat_path: None,
            baud_rate: 115200,
            extra_opts: String::new(),
            verbose: false,
            device_poll_attempts: 10,
            device_poll_interval_ms: 100,
        }
    }
}

impl BridgeConfig {
    /// PID file path, falling back to [`DEFAULT_PID_FILE`].
    pub fn pid_file(&self) -> &Path {
        match &self.pid_file {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => Path::new(DEFAULT_PID_FILE),
        }
    }

    /// socat executable, falling back to [`DEFAULT_SOCAT`].
    pub fn socat_path(&self) -> &Path {
        match &self.socat_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => Path::new(DEFAULT_SOCAT),
        }
    }

    /// Delay between output device checks.
    pub fn device_poll_interval(&self) -> Duration {
        Duration::from_millis(self.device_poll_interval_ms)
    }

    /// The two socat address arguments, input end first.
    ///
    /// ```
    /// use mock_serialport::BridgeConfig;
    ///
    /// let bridge = BridgeConfig {
    ///     baud_rate: 57600,
    ///     extra_opts: "crnl".into(),
    ///     ..Default::default()
    /// };
    /// let [input, output] = bridge.socat_command_args();
    /// assert_eq!(input, "pty,raw,echo=0,ispeed=57600,ospeed=57600,link=ttyIN,crnl");
    /// assert_eq!(output, "pty,raw,echo=0,ispeed=57600,ospeed=57600,link=ttyOUT,crnl");
    /// ```
    pub fn socat_command_args(&self) -> [String; 2] {
        let extra = if self.extra_opts.is_empty() || self.extra_opts.starts_with(',') {
            self.extra_opts.clone()
        } else {
            format!(",{}", self.extra_opts)
        };
        let address = |link: &Path| {
            format!(
                "pty,raw,echo=0,ispeed={baud},ospeed={baud},link={}{extra}",
                link.display(),
                baud = self.baud_rate,
            )
        };
        [address(&self.input_file), address(&self.output_file)]
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log format: "pretty" or "compact"
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset (e.g. "mock_serialport=debug")
    pub filter: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line format with colors
    Pretty,
    /// Single-line format
    #[default]
    Compact,
}
