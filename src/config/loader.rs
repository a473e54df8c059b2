//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "MOCK_SERIAL";

/// Config file name
const CONFIG_FILE_NAME: &str = "mock-serial.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "MOCK_SERIAL_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `MOCK_SERIAL_CONFIG` environment variable (explicit path)
    /// 2. `./mock-serial.toml` (current directory)
    /// 3. Built-in defaults (no file required)
    ///
    /// Environment variables can override any config file values.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = if let Some(ref path) = config_path {
            load_from_file(path)?
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config)?;

        Ok(Self { config_path, config })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> ConfigResult<Self> {
        let mut config = Config::default();
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: None,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}

fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

fn env_var(key: &str) -> (String, Option<String>) {
    let name = format!("{}_{}", ENV_PREFIX, key);
    let value = std::env::var(&name).ok();
    (name, value)
}

/// Apply environment variable overrides to the configuration.
///
/// Variables follow the pattern `MOCK_SERIAL_<KEY>`, for example
/// `MOCK_SERIAL_BAUD_RATE=57600` or `MOCK_SERIAL_OUTPUT=/tmp/ttyOUT`.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    let bridge = &mut config.bridge;

    if let (_, Some(val)) = env_var("INPUT") {
        bridge.input_file = PathBuf::from(val);
    }
    if let (_, Some(val)) = env_var("OUTPUT") {
        bridge.output_file = PathBuf::from(val);
    }
    if let (_, Some(val)) = env_var("PID_FILE") {
        bridge.pid_file = Some(PathBuf::from(val));
    }
    if let (_, Some(val)) = env_var("SOCAT") {
        bridge.socat_path = Some(PathBuf::from(val));
    }
    if let (name, Some(val)) = env_var("BAUD_RATE") {
        bridge.baud_rate = val
            .parse()
            .map_err(|_| ConfigError::env_parse(name, "Invalid baud rate"))?;
    }
    if let (_, Some(val)) = env_var("OPTS") {
        bridge.extra_opts = val;
    }
    if let (_, Some(val)) = env_var("VERBOSE") {
        bridge.verbose = val.to_lowercase() == "true" || val == "1";
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::io::Write;

    #[test]
    #[serial]
    fn test_default_loader() {
        let loader = ConfigLoader::with_defaults().unwrap();
        assert_eq!(loader.config().bridge.baud_rate, 115200);
        assert!(loader.config_path.is_none());
    }

    #[test]
    #[serial]
    fn test_env_override() {
        env::set_var("MOCK_SERIAL_BAUD_RATE", "57600");
        env::set_var("MOCK_SERIAL_OPTS", "crnl");
        env::set_var("MOCK_SERIAL_VERBOSE", "1");

        let loader = ConfigLoader::with_defaults().unwrap();
        assert_eq!(loader.config().bridge.baud_rate, 57600);
        assert_eq!(loader.config().bridge.extra_opts, "crnl");
        assert!(loader.config().bridge.verbose);

        env::remove_var("MOCK_SERIAL_BAUD_RATE");
        env::remove_var("MOCK_SERIAL_OPTS");
        env::remove_var("MOCK_SERIAL_VERBOSE");
    }

    #[test]
    #[serial]
    fn test_invalid_env_baud_rate() {
        env::set_var("MOCK_SERIAL_BAUD_RATE", "fast");

        let result = ConfigLoader::with_defaults();
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));

        env::remove_var("MOCK_SERIAL_BAUD_RATE");
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bridge]\npid_file = \"/tmp/bridge.pid\"\nbaud_rate = 4800").unwrap();

        let loader = ConfigLoader::load_from(file.path()).unwrap();
        assert_eq!(loader.config_path.as_deref(), Some(file.path()));
        assert_eq!(loader.config().bridge.baud_rate, 4800);
        assert_eq!(
            loader.config().bridge.pid_file(),
            Path::new("/tmp/bridge.pid")
        );
    }

    #[test]
    #[serial]
    fn test_missing_file_is_read_error() {
        let result = ConfigLoader::load_from("/nonexistent/mock-serial.toml");
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
