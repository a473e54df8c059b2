//! Serial port test double backed by socat.
//!
//! socat links two pseudo-terminals. The program under test opens the input
//! device as if it were real hardware; a [`Mock`] opens the output device,
//! watches the traffic and answers through a process callback.
//!
//! # Modules
//!
//! - `config`: bridge settings, TOML loading and environment overrides
//! - `error`: crate error type
//! - `flags`: registering bridge settings as command-line flags
//! - `framing`: ready-made process callbacks
//! - `logging`: tracing subscriber setup
//! - `mock`: the read/process loop
//! - `options`: settings plus the open and process callbacks
//! - `port`: port abstraction and implementations
//! - `supervisor`: socat process lifecycle and PID file

pub mod config;
pub mod error;
pub mod flags;
pub mod framing;
pub mod logging;
pub mod mock;
pub mod options;
pub mod port;
mod signal;
pub mod supervisor;

pub use config::{BridgeConfig, Config, ConfigError, ConfigLoader, ConfigResult};
pub use error::{MockError, MockResult};
pub use flags::{ClapFlags, FlagSet, FlagValues};
pub use mock::{HexBytes, Mock, READ_BUFFER_SIZE};
pub use options::{OpenFn, Options, ProcessFn};
pub use port::{Port, PortError, ScriptedPort, SerialDevice};
pub use supervisor::Supervisor;
