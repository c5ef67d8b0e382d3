//! Mock transport for deterministic testing without hardware.
//!
//! [`MockTransport`] implements [`Transport`] with pre-loaded
//! request/response pairs, so command encoding, error checks and reply
//! parsing can be exercised end to end.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use novitus::transport::{MockTransport, Transport};
//!
//! let mut mock = MockTransport::new();
//! mock.expect(b"\x1bP#nB2\x1b\\", b"\x1bP1#E0\x1b\\");
//!
//! mock.write(b"\x1bP#nB2\x1b\\")?;
//! let reply = mock.read_until(b"\x1b\\", Duration::from_millis(10))?;
//! assert_eq!(reply, b"\x1bP1#E0\x1b\\");
//! # Ok::<(), novitus::NovitusError>(())
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use super::{Transport, marker_end};
use crate::error::{NovitusError, Result};

/// A pre-loaded request/response pair.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be written.
    request: Vec<u8>,
    /// Bytes made available for reading once the request arrives.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing without a printer.
///
/// Expectations are consumed in order. Each `write()` is recorded and
/// matched against the next expectation; its response becomes readable.
/// An empty response models a command the device does not answer.
#[derive(Debug, Default)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    /// Bytes written but not yet read.
    pending: Vec<u8>,
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expected request/response pair.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Expect a write the device does not answer.
    pub fn expect_write(&mut self, request: &[u8]) {
        self.expect(request, &[]);
    }

    /// All data written through this transport, one entry per `write()`.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Number of expectations not yet consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    fn take_pending(&mut self, len: usize) -> Result<Vec<u8>> {
        if self.pending.is_empty() {
            return Err(NovitusError::communication("No reply from printer"));
        }
        Ok(self.pending.drain(..len).collect())
    }
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.sent_log.push(data.to_vec());

        let expectation = self.expectations.pop_front().ok_or_else(|| {
            NovitusError::communication("No more expectations in mock transport")
        })?;
        if data != expectation.request.as_slice() {
            return Err(NovitusError::communication(format!(
                "Unexpected write: expected {:02X?}, got {:02X?}",
                expectation.request, data
            )));
        }
        self.pending.extend_from_slice(&expectation.response);
        Ok(())
    }

    fn read(&mut self) -> Result<Vec<u8>> {
        let len = self.pending.len();
        self.take_pending(len)
    }

    fn read_until(&mut self, marker: &[u8], _timeout: Duration) -> Result<Vec<u8>> {
        let len = marker_end(&self.pending, marker).unwrap_or(self.pending.len());
        self.take_pending(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const END: &[u8] = b"\x1b\\";
    const TIMEOUT: Duration = Duration::from_millis(10);

    #[test]
    fn test_send_receive() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x10], &[0x04]);

        mock.write(&[0x10]).unwrap();
        assert_eq!(mock.read().unwrap(), vec![0x04]);
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[test]
    fn test_tracks_sent_data() {
        let mut mock = MockTransport::new();
        mock.expect_write(b"one");
        mock.expect_write(b"two");
        mock.write(b"one").unwrap();
        mock.write(b"two").unwrap();
        assert_eq!(mock.sent_data(), &[b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn test_unexpected_write_fails() {
        let mut mock = MockTransport::new();
        mock.expect_write(b"abc");
        assert!(matches!(
            mock.write(b"xyz"),
            Err(NovitusError::Communication(_))
        ));
    }

    #[test]
    fn test_exhausted_expectations_fail() {
        let mut mock = MockTransport::new();
        assert!(mock.write(b"abc").is_err());
        assert_eq!(mock.sent_data().len(), 1);
    }

    #[test]
    fn test_no_reply_is_communication_error() {
        let mut mock = MockTransport::new();
        mock.expect_write(b"cmd");
        mock.write(b"cmd").unwrap();
        assert!(matches!(mock.read(), Err(NovitusError::Communication(_))));
        assert!(matches!(
            mock.read_until(END, TIMEOUT),
            Err(NovitusError::Communication(_))
        ));
    }

    #[test]
    fn test_read_until_stops_at_marker() {
        let mut mock = MockTransport::new();
        mock.expect(b"q", b"\x1bPA\x1b\\\x1bPB\x1b\\");
        mock.write(b"q").unwrap();
        assert_eq!(mock.read_until(END, TIMEOUT).unwrap(), b"\x1bPA\x1b\\");
        assert_eq!(mock.read_until(END, TIMEOUT).unwrap(), b"\x1bPB\x1b\\");
    }

    #[test]
    fn test_read_until_without_marker_returns_partial() {
        let mut mock = MockTransport::new();
        mock.expect(b"q", b"\x1bP1#E");
        mock.write(b"q").unwrap();
        assert_eq!(mock.read_until(END, TIMEOUT).unwrap(), b"\x1bP1#E");
    }
}
