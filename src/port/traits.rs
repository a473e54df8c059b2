//! The byte-level capability the read loop depends on.

use super::error::PortError;

/// Blocking read and write of byte buffers.
///
/// Anything that can move bytes in and out of the output device satisfies
/// this: a real serial port, a raw pty file, or a scripted port in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Port: Send {
    /// Read bytes into `buffer`, returning how many were read.
    ///
    /// `Ok(0)` means the stream has ended.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Write bytes from `data`, returning how many were written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;
}

impl<P: Port + ?Sized> Port for Box<P> {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        (**self).read_bytes(buffer)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        (**self).write_bytes(data)
    }
}
