//! Configuration module for mock_serialport.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `MOCK_SERIAL_CONFIG` environment variable (explicit path)
//! 2. `./mock-serial.toml` (current directory)
//! 3. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! `MOCK_SERIAL_INPUT`, `MOCK_SERIAL_OUTPUT`, `MOCK_SERIAL_PID_FILE`,
//! `MOCK_SERIAL_SOCAT`, `MOCK_SERIAL_BAUD_RATE`, `MOCK_SERIAL_OPTS` and
//! `MOCK_SERIAL_VERBOSE` override the matching `[bridge]` keys.
//!
//! # Example
//!
//! ```toml
//! [bridge]
//! input_file = "ttyIN"
//! output_file = "ttyOUT"
//! baud_rate = 57600
//! extra_opts = "crnl"
//!
//! [logging]
//! format = "compact"
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{resolve_config_path, ConfigLoader};
pub use schema::{
    BridgeConfig, Config, LogFormat, LoggingConfig, DEFAULT_PID_FILE, DEFAULT_SOCAT,
};
