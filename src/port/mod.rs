//! Port abstraction layer.
//!
//! The read loop only needs [`Port`]. [`SerialDevice`] is the default way to
//! open the output device; [`ScriptedPort`] stands in for it in tests.

pub mod error;
pub mod scripted;
pub mod serial_device;
pub mod traits;

pub use error::PortError;
pub use scripted::ScriptedPort;
pub use serial_device::SerialDevice;
pub use traits::*;
