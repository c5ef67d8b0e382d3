//! # Novitus Protocol Implementation
//!
//! This module provides the codec layer for the Novitus fiscal printer
//! protocol: framing, checksums, the national code pages, the command token
//! grammar, status bytes and structured replies.
//!
//! ## Module Structure
//!
//! - [`codepage`]: Mazovia and Windows-1250 character tables
//! - [`checksum`]: XOR checksum rendered as two hex characters
//! - [`frame`]: `ESC P ... ESC \` framing
//! - [`grammar`]: number, line and flag token formatting
//! - [`commands`]: command model, control bytes, device commands
//! - [`status`]: `DLE` / `ENQ` status byte decoding
//! - [`numeric`]: exact two-decimal amounts and tax rate sentinels
//! - [`reply`]: tagged reply parsing
//!
//! ## Usage Example
//!
//! ```
//! use novitus::protocol::{codepage::CodePage, commands, frame, reply::Reply};
//!
//! // Build the error query frame
//! let bytes = commands::error_query().encode(CodePage::Mazovia)?;
//! assert_eq!(bytes, b"\x1bP#nB2\x1b\\");
//!
//! // Decode the device's answer
//! let body = frame::unwrap_reply(b"\x1bP1#E0\x1b\\")?;
//! assert_eq!(Reply::parse(body, CodePage::Mazovia)?, Reply::ErrorCode(0));
//! # Ok::<(), novitus::NovitusError>(())
//! ```

pub mod checksum;
pub mod codepage;
pub mod commands;
pub mod frame;
pub mod grammar;
pub mod numeric;
pub mod reply;
pub mod status;
