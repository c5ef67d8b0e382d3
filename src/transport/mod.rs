//! # Printer Transport Layer
//!
//! This module provides communication backends for talking to the printer.
//! The protocol is strictly request/response with one exchange in flight, so
//! the transport surface is small and blocking.
//!
//! ## Available Transports
//!
//! - [`serial`]: RS-232 / USB serial port
//! - [`mock`]: Scripted request/response pairs for tests

use std::time::Duration;

use crate::error::Result;

pub mod mock;
pub mod serial;

pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Byte-level link to the printer.
///
/// Implementations fail with [`crate::NovitusError::Communication`] when a
/// read produces no data.
pub trait Transport {
    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read whatever the device has sent, waiting up to the transport's
    /// default timeout. Used for single status bytes.
    fn read(&mut self) -> Result<Vec<u8>>;

    /// Read until `marker` has been received (inclusive) or `timeout`
    /// expires. Bytes received before the deadline are returned even if the
    /// marker never arrived.
    fn read_until(&mut self, marker: &[u8], timeout: Duration) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn read(&mut self) -> Result<Vec<u8>> {
        (**self).read()
    }

    fn read_until(&mut self, marker: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        (**self).read_until(marker, timeout)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn read(&mut self) -> Result<Vec<u8>> {
        (**self).read()
    }

    fn read_until(&mut self, marker: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        (**self).read_until(marker, timeout)
    }
}

/// Position just past the first occurrence of `marker` in `data`.
pub(crate) fn marker_end(data: &[u8], marker: &[u8]) -> Option<usize> {
    if marker.is_empty() || data.len() < marker.len() {
        return None;
    }
    data.windows(marker.len())
        .position(|window| window == marker)
        .map(|pos| pos + marker.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_end() {
        assert_eq!(marker_end(b"ab\x1b\\cd", b"\x1b\\"), Some(4));
        assert_eq!(marker_end(b"\x1b\\", b"\x1b\\"), Some(2));
        assert_eq!(marker_end(b"abc", b"\x1b\\"), None);
        assert_eq!(marker_end(b"", b"\x1b\\"), None);
        assert_eq!(marker_end(b"abc", b""), None);
    }
}
