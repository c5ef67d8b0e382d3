//! # Novitus - Fiscal Printer Protocol Library
//!
//! A Rust library for driving Novitus fiscal printers over a serial link.
//! It provides:
//!
//! - **Protocol codec**: framing, checksums, Mazovia / Windows-1250 code pages
//! - **Command grammar**: receipts, invoices, payments, cash movements
//! - **Reply parsing**: status bytes, error numbers, cash register data
//! - **Transport**: serial port, plus a scripted mock for tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use novitus::{
//!     printer::{Printer, PrinterConfig},
//!     receipt::{Item, Payment, PaymentType, ReceiptBegin, ReceiptClose},
//! };
//!
//! let config = PrinterConfig {
//!     device: "/dev/ttyUSB0".to_string(),
//!     ..Default::default()
//! };
//! let mut printer = Printer::open(config)?;
//!
//! printer.receipt_begin(&ReceiptBegin::new())?;
//! printer.item(&Item::new(1, "Chleb żytni", 1.0, "B", 6.99))?;
//! printer.payment(&Payment::new(PaymentType::Card, 6.99))?;
//! printer.receipt_close(&ReceiptClose::new(6.99, "Anna"))?;
//!
//! for (slot, rate) in printer.tax_rates()? {
//!     println!("PTU {}: {}", slot, rate);
//! }
//! # Ok::<(), novitus::NovitusError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Codec: frames, code pages, grammar, replies |
//! | [`receipt`] | Fiscal document command builders |
//! | [`printer`] | Driver and configuration |
//! | [`transport`] | Communication backends |
//! | [`error`] | Error types and the device error table |

pub mod error;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod transport;

// Re-exports for convenience
pub use error::{NovitusError, ProtocolError, Result};
pub use printer::{Printer, PrinterConfig};
pub use protocol::codepage::CodePage;
pub use transport::{MockTransport, SerialTransport, Transport};
