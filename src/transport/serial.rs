//! # Serial Port Transport
//!
//! Communication with Novitus printers over RS-232 or a USB serial adapter,
//! built on the `serialport` crate.
//!
//! ## Line Settings
//!
//! - **8N1**: 8 data bits, no parity, one stop bit
//! - **No flow control**: XON/XOFF must stay off, since 0x11 and 0x13 can
//!   appear in Mazovia-encoded text
//! - **Baud rate**: one of [`SUPPORTED_BAUD_RATES`]
//!
//! ## Permissions
//!
//! On most Linux distributions the user must be in the `dialout` group to
//! open `/dev/ttyS*` or `/dev/ttyUSB*`.

use std::fmt;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use super::{Transport, marker_end};
use crate::error::{NovitusError, Result};

/// Default serial device path
pub const DEFAULT_DEVICE: &str = "/dev/ttyS0";

/// Baud rates the printer supports.
pub const SUPPORTED_BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

/// Size of one read from the port.
const READ_CHUNK: usize = 256;

/// # Serial Printer Transport
///
/// ## Example
///
/// ```no_run
/// use std::time::Duration;
/// use novitus::transport::{SerialTransport, Transport};
///
/// let mut transport = SerialTransport::open("/dev/ttyUSB0", 9600, Duration::from_secs(10))?;
/// transport.write(&[0x07])?; // BEL
/// # Ok::<(), novitus::NovitusError>(())
/// ```
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SerialTransport {
    /// Open and configure a serial device.
    ///
    /// `timeout` bounds [`Transport::read`]; framed replies use the timeout
    /// passed to [`Transport::read_until`].
    ///
    /// ## Errors
    ///
    /// Returns [`NovitusError::Transport`] if:
    /// - The baud rate is not one of [`SUPPORTED_BAUD_RATES`]
    /// - The device doesn't exist or permission is denied
    pub fn open(device: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        check_baud_rate(baud_rate)?;

        let port = serialport::new(device, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|e| NovitusError::Transport(format!("Failed to open {}: {}", device, e)))?;

        info!(device, baud_rate, "Opened serial transport");

        Ok(Self { port, timeout })
    }

    /// Open with the default device path and 9600 baud.
    pub fn open_default(timeout: Duration) -> Result<Self> {
        Self::open(DEFAULT_DEVICE, 9600, timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.apply_timeout(timeout)?;
        self.timeout = timeout;
        Ok(())
    }

    fn apply_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.port
            .set_timeout(timeout)
            .map_err(|e| NovitusError::Transport(format!("Setting timeout failed: {}", e)))
    }

    /// One read bounded by the port timeout. `Ok(0)` means nothing arrived.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(NovitusError::Transport(format!("Read failed: {}", e))),
        }
    }

    fn collect_until(&mut self, marker: &[u8], deadline: Instant) -> Result<Vec<u8>> {
        let mut received = Vec::new();
        let mut buf = [0u8; READ_CHUNK];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(received);
            }
            self.apply_timeout(remaining)?;

            let n = self.read_chunk(&mut buf)?;
            if n == 0 {
                continue;
            }
            received.extend_from_slice(&buf[..n]);
            if let Some(end) = marker_end(&received, marker) {
                if end < received.len() {
                    debug!(dropped = received.len() - end, "Discarding bytes after reply marker");
                    received.truncate(end);
                }
                return Ok(received);
            }
        }
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.port
            .write_all(data)
            .map_err(|e| NovitusError::Transport(format!("Write failed: {}", e)))?;
        self.port
            .flush()
            .map_err(|e| NovitusError::Transport(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    fn read(&mut self) -> Result<Vec<u8>> {
        let mut buf = [0u8; READ_CHUNK];
        match self.read_chunk(&mut buf)? {
            0 => Err(NovitusError::communication("No reply from printer")),
            n => Ok(buf[..n].to_vec()),
        }
    }

    fn read_until(&mut self, marker: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let received = self.collect_until(marker, deadline);
        self.apply_timeout(self.timeout)?;
        let received = received?;

        if received.is_empty() {
            return Err(NovitusError::communication(format!(
                "No reply from printer within {} ms",
                timeout.as_millis()
            )));
        }
        Ok(received)
    }
}

/// Serial ports present on this machine.
pub fn available_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(|e| {
        NovitusError::Transport(format!("Could not enumerate serial ports: {}", e))
    })?;
    Ok(ports.into_iter().map(|port| port.port_name).collect())
}

fn check_baud_rate(baud_rate: u32) -> Result<()> {
    if SUPPORTED_BAUD_RATES.contains(&baud_rate) {
        return Ok(());
    }
    Err(NovitusError::Transport(format!(
        "Unsupported baud rate {} (use one of {:?})",
        baud_rate, SUPPORTED_BAUD_RATES
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device_path() {
        assert_eq!(DEFAULT_DEVICE, "/dev/ttyS0");
    }

    #[test]
    fn test_supported_baud_rates_accepted() {
        for baud in SUPPORTED_BAUD_RATES {
            assert!(check_baud_rate(baud).is_ok(), "{baud}");
        }
    }

    #[test]
    fn test_unsupported_baud_rate_rejected() {
        assert!(check_baud_rate(1200).is_err());
        let err = SerialTransport::open("/dev/null", 1200, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, NovitusError::Transport(_)));
    }

    #[test]
    fn test_missing_device_is_transport_error() {
        let err = SerialTransport::open(
            "/dev/novitus-does-not-exist",
            9600,
            Duration::from_millis(10),
        )
        .unwrap_err();
        assert!(matches!(err, NovitusError::Transport(_)));
    }

    // Note: reading and writing require a connected printer.
}
