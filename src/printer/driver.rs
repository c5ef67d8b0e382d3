//! # Printer Driver
//!
//! [`Printer`] ties the codec to a [`Transport`]. Every operation is one
//! synchronous exchange; the printer is borrowed mutably for its duration so
//! a second command cannot start before the first has been answered.
//!
//! Three exchange shapes cover every command:
//!
//! | Shape | Steps | Used for |
//! |-------|-------|----------|
//! | [`Printer::send`] | write | drawer, error mode |
//! | [`Printer::execute`] | write, wait, `#n` error query | fiscal commands |
//! | [`Printer::query`] | write, read framed reply | data queries |
//!
//! ```no_run
//! use novitus::printer::{Printer, PrinterConfig};
//! use novitus::receipt::{Item, ReceiptBegin, ReceiptClose};
//!
//! let mut printer = Printer::open(PrinterConfig::default())?;
//! printer.receipt_begin(&ReceiptBegin::new())?;
//! printer.item(&Item::new(1, "Kawa", 1.0, "A", 9.50))?;
//! printer.receipt_close(&ReceiptClose::new(9.50, "Anna").cash(10.0))?;
//! # Ok::<(), novitus::NovitusError>(())
//! ```

use std::thread;

use tracing::{debug, warn};

use super::config::PrinterConfig;
use crate::error::{NovitusError, Result, lookup_error};
use crate::protocol::codepage::CodePage;
use crate::protocol::commands::{self, BEL, CAN, Command, DLE, ENQ, ErrorHandling};
use crate::protocol::frame::{FRAME_END, to_hex, unwrap_reply};
use crate::protocol::numeric::Percentage;
use crate::protocol::reply::{CashRegisterSnapshot, Reply};
use crate::protocol::status::{DeviceStatus, TransactionStatus};
use crate::receipt::{self, InvoiceBegin, InvoiceClose, Item, Payment, ReceiptBegin, ReceiptClose};
use crate::transport::{SerialTransport, Transport};

/// # Fiscal Printer
pub struct Printer<T: Transport> {
    transport: T,
    config: PrinterConfig,
}

impl Printer<SerialTransport> {
    /// Open the configured serial device.
    ///
    /// If the config sets `error_handling`, that mode is sent before
    /// returning.
    pub fn open(config: PrinterConfig) -> Result<Self> {
        config.validate()?;
        let transport = SerialTransport::open(&config.device, config.baud_rate, config.timeout())?;
        Self::connect(transport, config)
    }
}

impl<T: Transport> Printer<T> {
    /// Wrap a transport without sending anything.
    pub fn new(transport: T, config: PrinterConfig) -> Self {
        Self { transport, config }
    }

    /// Wrap a transport and apply the configured error handling mode.
    pub fn connect(transport: T, config: PrinterConfig) -> Result<Self> {
        let mut printer = Self::new(transport, config);
        if let Some(mode) = printer.config.error_handling {
            printer.set_error_handling(mode)?;
        }
        Ok(printer)
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn code_page(&self) -> CodePage {
        self.config.code_page
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    // ========================================================================
    // EXCHANGES
    // ========================================================================

    /// Encode and write a command. Nothing is written if encoding fails.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        let bytes = command.encode(self.config.code_page)?;
        debug!(command = %command, frame = %to_hex(&bytes), "Sending command");
        self.transport.write(&bytes)
    }

    /// Send a command, then confirm through the error query that the device
    /// accepted it.
    pub fn execute(&mut self, command: &Command) -> Result<()> {
        self.send(command)?;
        self.check_error()
    }

    /// Send a command and decode its framed reply.
    pub fn query(&mut self, command: &Command) -> Result<Reply> {
        self.send(command)?;

        let raw = self
            .transport
            .read_until(&FRAME_END, self.config.reply_timeout())?;
        debug!(reply = %to_hex(&raw), "Received reply");

        let body = unwrap_reply(&raw)?;
        Reply::parse(body, self.config.code_page)
    }

    fn control(&mut self, byte: u8) -> Result<()> {
        debug!(byte = %format!("{:#04x}", byte), "Sending control byte");
        self.transport.write(&[byte])
    }

    // ========================================================================
    // STATUS AND ERRORS
    // ========================================================================

    /// Mechanism status (`DLE`).
    pub fn device_status(&mut self) -> Result<DeviceStatus> {
        self.control(DLE)?;
        let reply = self.transport.read()?;
        DeviceStatus::from_reply(&reply)
    }

    /// Transaction status (`ENQ`).
    pub fn transaction_status(&mut self) -> Result<TransactionStatus> {
        self.control(ENQ)?;
        let reply = self.transport.read()?;
        TransactionStatus::from_reply(&reply)
    }

    /// Sound the buzzer.
    pub fn bell(&mut self) -> Result<()> {
        self.control(BEL)
    }

    /// Abort the command the device is currently receiving.
    pub fn cancel(&mut self) -> Result<()> {
        self.control(CAN)
    }

    pub fn set_error_handling(&mut self, mode: ErrorHandling) -> Result<()> {
        self.send(&commands::set_error_handling(mode))
    }

    /// Error number of the last command; `0` means success.
    pub fn last_error(&mut self) -> Result<u32> {
        match self.query(&commands::error_query())? {
            Reply::ErrorCode(code) => Ok(code),
            other => Err(NovitusError::reply_not_implemented(format!(
                "Expected an error number, got a {} reply",
                other.tag()
            ))),
        }
    }

    /// Wait for the device to process the previous command, then raise its
    /// error code if nonzero.
    pub fn check_error(&mut self) -> Result<()> {
        thread::sleep(self.config.error_check_delay());
        let code = self.last_error()?;
        if code != 0 {
            let error = lookup_error(code);
            warn!(code, message = error.message, "Printer rejected command");
            return Err(error.into());
        }
        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn cash_register_data(&mut self, mode: u8) -> Result<CashRegisterSnapshot> {
        match self.query(&commands::cash_register_data(mode))? {
            Reply::CashRegister(snapshot) => Ok(snapshot),
            other => Err(NovitusError::reply_not_implemented(format!(
                "Expected cash register data, got a {} reply",
                other.tag()
            ))),
        }
    }

    /// Programmed tax rates, slots `A`..`G`.
    pub fn tax_rates(&mut self) -> Result<Vec<(char, Percentage)>> {
        self.cash_register_data(commands::TAX_RATES_MODE)
            .map(|snapshot| snapshot.tax_rates())
    }

    // ========================================================================
    // FISCAL DOCUMENTS
    // ========================================================================

    pub fn receipt_begin(&mut self, begin: &ReceiptBegin) -> Result<()> {
        self.execute(&begin.command())
    }

    pub fn item(&mut self, item: &Item) -> Result<()> {
        self.execute(&item.command())
    }

    pub fn discount(&mut self, name: &str, value: &str) -> Result<()> {
        self.execute(&receipt::discount(name, value))
    }

    pub fn markup(&mut self, name: &str, value: &str) -> Result<()> {
        self.execute(&receipt::markup(name, value))
    }

    pub fn payment(&mut self, payment: &Payment) -> Result<()> {
        self.execute(&payment.command())
    }

    pub fn receipt_cancel(&mut self) -> Result<()> {
        self.execute(&receipt::receipt_cancel())
    }

    pub fn receipt_close(&mut self, close: &ReceiptClose) -> Result<()> {
        self.execute(&close.command())
    }

    pub fn invoice_begin(&mut self, begin: &InvoiceBegin) -> Result<()> {
        self.execute(&begin.command())
    }

    pub fn invoice_close(&mut self, close: &InvoiceClose) -> Result<()> {
        self.execute(&close.command())
    }

    pub fn nonfiscal<S: AsRef<str>>(&mut self, form: u32, lines: &[S]) -> Result<()> {
        self.execute(&receipt::nonfiscal(form, lines))
    }

    // ========================================================================
    // CASH DRAWER
    // ========================================================================

    pub fn open_drawer(&mut self) -> Result<()> {
        self.send(&commands::open_drawer())
    }

    pub fn cash_in(&mut self, amount: f64) -> Result<()> {
        self.execute(&commands::cash_in(amount))
    }

    pub fn cash_out(&mut self, amount: f64) -> Result<()> {
        self.execute(&commands::cash_out(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    const NO_ERROR: &[u8] = b"\x1bP1#E0\x1b\\";

    fn config() -> PrinterConfig {
        PrinterConfig {
            error_check_delay_ms: 0,
            ..Default::default()
        }
    }

    fn frame(command: &Command) -> Vec<u8> {
        command.encode(CodePage::Mazovia).unwrap()
    }

    #[test]
    fn test_device_status() {
        let mut mock = MockTransport::new();
        mock.expect(&[DLE], &[0b0000_0100]);
        let mut printer = Printer::new(&mut mock, config());

        let status = printer.device_status().unwrap();
        assert!(status.online);
        assert!(!status.paper_error);
    }

    #[test]
    fn test_transaction_status() {
        let mut mock = MockTransport::new();
        mock.expect(&[ENQ], &[0b0000_1010]);
        let mut printer = Printer::new(&mut mock, config());

        let status = printer.transaction_status().unwrap();
        assert!(status.in_transaction);
        assert!(status.fiscal);
        assert!(!status.last_transaction_correct);
    }

    #[test]
    fn test_bell_and_cancel_are_raw() {
        let mut mock = MockTransport::new();
        mock.expect_write(&[BEL]);
        mock.expect_write(&[CAN]);
        let mut printer = Printer::new(&mut mock, config());
        printer.bell().unwrap();
        printer.cancel().unwrap();
        drop(printer);
        assert_eq!(mock.sent_data(), &[vec![BEL], vec![CAN]]);
    }

    #[test]
    fn test_last_error() {
        let mut mock = MockTransport::new();
        mock.expect(&frame(&commands::error_query()), b"\x1bP1#E1037\x1b\\");
        let mut printer = Printer::new(&mut mock, config());
        assert_eq!(printer.last_error().unwrap(), 1037);
    }

    #[test]
    fn test_connect_applies_error_handling() {
        let mut mock = MockTransport::new();
        mock.expect_write(&frame(&commands::set_error_handling(ErrorHandling::Silent)));
        let config = PrinterConfig {
            error_handling: Some(ErrorHandling::Silent),
            ..config()
        };
        Printer::connect(&mut mock, config).unwrap();
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[test]
    fn test_execute_checks_error() {
        let mut mock = MockTransport::new();
        mock.expect_write(&frame(&commands::cash_in(10.0)));
        mock.expect(&frame(&commands::error_query()), NO_ERROR);
        let mut printer = Printer::new(&mut mock, config());
        printer.cash_in(10.0).unwrap();
        drop(printer);
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[test]
    fn test_wrong_reply_kind_is_rejected() {
        let mut mock = MockTransport::new();
        mock.expect(&frame(&commands::cash_register_data(21)), NO_ERROR);
        let mut printer = Printer::new(&mut mock, config());
        assert!(matches!(
            printer.cash_register_data(21),
            Err(NovitusError::ReplyNotImplemented(_))
        ));
    }
}
