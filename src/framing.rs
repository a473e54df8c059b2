//! Ready-made process callbacks for common byte protocols.
//!
//! Each function returns a closure for [`Options::with_process`](crate::Options::with_process).

use crate::mock::Mock;
use tracing::warn;

/// Split input on `delimiter` and hand each complete frame to `on_frame`.
///
/// Frames are passed without the delimiter. A trailing partial frame is kept
/// until the rest of it arrives.
///
/// ```
/// use mock_serialport::{framing, BridgeConfig, Options};
///
/// let options = Options::new(BridgeConfig::default()).with_process(framing::delimited(
///     b'\n',
///     |mock, line| {
///         if line == b"PING" {
///             let _ = mock.write(b"PONG\n");
///         }
///     },
/// ));
/// # let _ = options;
/// ```
pub fn delimited<F>(
    delimiter: u8,
    on_frame: F,
) -> impl Fn(&mut Mock, Vec<u8>) -> Vec<u8> + Send + Sync + 'static
where
    F: Fn(&mut Mock, &[u8]) + Send + Sync + 'static,
{
    move |mock: &mut Mock, mut data: Vec<u8>| {
        let mut start = 0;
        while let Some(offset) = memchr::memchr(delimiter, &data[start..]) {
            let end = start + offset;
            on_frame(mock, &data[start..end]);
            start = end + 1;
        }
        data.drain(..start);
        data
    }
}

/// Write every received chunk straight back.
pub fn echo() -> impl Fn(&mut Mock, Vec<u8>) -> Vec<u8> + Send + Sync + 'static {
    |mock: &mut Mock, data: Vec<u8>| {
        if let Err(e) = mock.write(&data) {
            if mock.options().bridge.verbose {
                warn!(error = %e, "echo failed");
            }
        }
        Vec::new()
    }
}

/// Answer fixed request tokens with fixed replies.
///
/// Input is matched from the front: a complete request is consumed and its
/// reply written; a prefix of some request is kept for the next read; any
/// other leading byte is discarded.
///
/// ```
/// use mock_serialport::{framing, BridgeConfig, Options};
///
/// let options = Options::new(BridgeConfig::default()).with_process(framing::replies([
///     ("hello", "world"),
///     ("foo", "bar"),
/// ]));
/// # let _ = options;
/// ```
pub fn replies<I, Q, R>(table: I) -> impl Fn(&mut Mock, Vec<u8>) -> Vec<u8> + Send + Sync + 'static
where
    I: IntoIterator<Item = (Q, R)>,
    Q: AsRef<[u8]>,
    R: AsRef<[u8]>,
{
    let table: Vec<(Vec<u8>, Vec<u8>)> = table
        .into_iter()
        .map(|(request, reply)| (request.as_ref().to_vec(), reply.as_ref().to_vec()))
        .filter(|(request, _)| !request.is_empty())
        .collect();

    move |mock: &mut Mock, mut data: Vec<u8>| {
        while !data.is_empty() {
            if let Some((request, reply)) = table.iter().find(|(req, _)| data.starts_with(req)) {
                if let Err(e) = mock.write(reply) {
                    if mock.options().bridge.verbose {
                        warn!(error = %e, "reply failed");
                    }
                }
                data.drain(..request.len());
            } else if table.iter().any(|(req, _)| req.starts_with(&data)) {
                break;
            } else {
                data.remove(0);
            }
        }
        data
    }
}
