//! # Status Bytes
//!
//! The two unsolicited status queries (`DLE`, `ENQ`) are answered with a
//! single raw byte, no framing and no checksum. Bits are numbered LSB-first:
//! flag `i` is bit `i % 8` of byte `i / 8`.
//!
//! ```text
//! DLE reply  bit 0: printer error   bit 1: paper error   bit 2: online
//! ENQ reply  bit 0: last transaction correct   bit 1: in transaction
//!            bit 2: last command error         bit 3: fiscal mode
//! ```

use serde::Serialize;

use crate::error::{NovitusError, Result};

/// Unpack bytes into flags, LSB-first within each byte.
///
/// ## Example
///
/// ```
/// use novitus::protocol::status::unpack_flags;
///
/// // 'm' = 0x6D = 0b0110_1101
/// assert_eq!(
///     unpack_flags(b"m"),
///     vec![true, false, true, true, false, true, true, false]
/// );
/// ```
pub fn unpack_flags(bytes: &[u8]) -> Vec<bool> {
    (0..bytes.len() * 8)
        .map(|i| bytes[i / 8] & (1 << (i % 8)) != 0)
        .collect()
}

fn first_byte(bytes: &[u8], query: &str) -> Result<u8> {
    bytes.first().copied().ok_or_else(|| {
        NovitusError::communication(format!("No reply to {} status query", query))
    })
}

/// Printer mechanism state, as answered to `DLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeviceStatus {
    pub printer_error: bool,
    pub paper_error: bool,
    pub online: bool,
}

impl DeviceStatus {
    pub fn from_byte(byte: u8) -> Self {
        let flags = unpack_flags(&[byte]);
        Self {
            printer_error: flags[0],
            paper_error: flags[1],
            online: flags[2],
        }
    }

    /// Decode the raw `DLE` reply.
    pub fn from_reply(bytes: &[u8]) -> Result<Self> {
        first_byte(bytes, "DLE").map(Self::from_byte)
    }
}

/// Fiscal transaction state, as answered to `ENQ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TransactionStatus {
    pub last_transaction_correct: bool,
    pub in_transaction: bool,
    pub last_command_error: bool,
    pub fiscal: bool,
}

impl TransactionStatus {
    pub fn from_byte(byte: u8) -> Self {
        let flags = unpack_flags(&[byte]);
        Self {
            last_transaction_correct: flags[0],
            in_transaction: flags[1],
            last_command_error: flags[2],
            fiscal: flags[3],
        }
    }

    /// Decode the raw `ENQ` reply.
    pub fn from_reply(bytes: &[u8]) -> Result<Self> {
        first_byte(bytes, "ENQ").map(Self::from_byte)
    }
}
