//! In-memory [`Port`] with a pre-programmed read script.
//!
//! Lets Process callbacks and the read loop be exercised without socat or a
//! pty. Reads are served from a queue of chunks and errors; once the queue is
//! drained every read returns `Ok(0)`, which ends a read loop cleanly.

use super::error::PortError;
use super::traits::Port;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

#[derive(Debug)]
enum ScriptedRead {
    Data(Vec<u8>),
    Error(io::ErrorKind),
}

#[derive(Debug, Default)]
struct ScriptState {
    reads: VecDeque<ScriptedRead>,
    write_log: Vec<Vec<u8>>,
    write_error: Option<io::ErrorKind>,
}

/// Scripted port for tests.
///
/// Clones share state, so a test can keep one clone for inspection while the
/// other is boxed and handed to a `Mock`.
///
/// # Example
/// ```
/// use mock_serialport::port::{Port, ScriptedPort};
///
/// let mut port = ScriptedPort::new();
/// port.enqueue_read(b"hel");
/// port.enqueue_read(b"lo");
///
/// let mut buffer = [0u8; 16];
/// assert_eq!(port.read_bytes(&mut buffer).unwrap(), 3);
/// assert_eq!(port.read_bytes(&mut buffer).unwrap(), 2);
/// assert_eq!(port.read_bytes(&mut buffer).unwrap(), 0);
///
/// port.write_bytes(b"world").unwrap();
/// assert_eq!(port.written(), b"world");
/// ```
#[derive(Clone, Default)]
pub struct ScriptedPort {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one chunk to be returned by a single read.
    ///
    /// Chunks longer than the reader's buffer are split across reads.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state
            .lock()
            .reads
            .push_back(ScriptedRead::Data(data.to_vec()));
    }

    /// Queue a read that fails with `kind`.
    pub fn enqueue_error(&mut self, kind: io::ErrorKind) {
        self.state.lock().reads.push_back(ScriptedRead::Error(kind));
    }

    /// Make the next write fail with `kind`.
    pub fn fail_next_write(&mut self, kind: io::ErrorKind) {
        self.state.lock().write_error = Some(kind);
    }

    /// Every successful write, one entry per call.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// All successfully written bytes, concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().write_log.concat()
    }

    /// Number of reads still queued.
    pub fn pending_reads(&self) -> usize {
        self.state.lock().reads.len()
    }

    /// Box a clone of this port for use as an `Open` result.
    pub fn boxed(&self) -> Box<dyn Port> {
        Box::new(self.clone())
    }
}

impl Port for ScriptedPort {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        match state.reads.pop_front() {
            None => Ok(0),
            Some(ScriptedRead::Error(kind)) => Err(PortError::Io(io::Error::from(kind))),
            Some(ScriptedRead::Data(mut data)) => {
                let n = data.len().min(buffer.len());
                buffer[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    state.reads.push_front(ScriptedRead::Data(rest));
                }
                Ok(n)
            }
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        if let Some(kind) = state.write_error.take() {
            return Err(PortError::Io(io::Error::from(kind)));
        }
        state.write_log.push(data.to_vec());
        Ok(data.len())
    }
}

impl std::fmt::Debug for ScriptedPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedPort")
            .field("pending_reads", &self.pending_reads())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_in_order_then_end_of_stream() {
        let mut port = ScriptedPort::new();
        port.enqueue_read(b"foo");
        port.enqueue_read(b"bar");

        let mut buffer = [0u8; 10];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"foo");
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"bar");
        assert_eq!(port.read_bytes(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_long_chunk_is_split() {
        let mut port = ScriptedPort::new();
        port.enqueue_read(b"Hello, World!");

        let mut buffer = [0u8; 5];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"Hello");
        assert_eq!(port.pending_reads(), 1);

        let mut rest = [0u8; 16];
        let n = port.read_bytes(&mut rest).unwrap();
        assert_eq!(&rest[..n], b", World!");
    }

    #[test]
    fn test_scripted_error() {
        let mut port = ScriptedPort::new();
        port.enqueue_error(io::ErrorKind::BrokenPipe);

        let mut buffer = [0u8; 4];
        let err = port.read_bytes(&mut buffer).unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_write_failure_is_one_shot() {
        let mut port = ScriptedPort::new();
        port.fail_next_write(io::ErrorKind::TimedOut);

        assert!(port.write_bytes(b"lost").is_err());
        port.write_bytes(b"kept").unwrap();
        assert_eq!(port.write_log(), vec![b"kept".to_vec()]);
    }

    #[test]
    fn test_clones_share_state() {
        let observer = ScriptedPort::new();
        let mut boxed = observer.boxed();
        boxed.write_bytes(b"shared").unwrap();
        assert_eq!(observer.written(), b"shared");
    }
}
