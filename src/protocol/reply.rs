//! # Reply Parser
//!
//! Framed replies start with a 3-byte type tag. Each known tag has exactly
//! one parser; anything else fails with
//! [`NovitusError::ReplyNotImplemented`] rather than being guessed at.
//!
//! | Tag | Reply | Checksum |
//! |-----|-------|----------|
//! | `1#E` | Error number (answer to `#n`) | no |
//! | `2#X` | Cash register data (answer to `#s`) | yes |
//!
//! ## Cash register record
//!
//! ```text
//! 2#X 0;1;0;1; 1; 0; 20;07;23/ 23.00/.../101.00/ 169/ 810.19/.../0.00/ 0.00/ ABC1234567890 F1
//!     flags    ?  Z  yy mm dd  PTU A..G           RC   TOT A..G          cash  serial    sum
//! ```

use chrono::NaiveDate;
use serde::Serialize;

use super::codepage::CodePage;
use super::frame::{CHECKSUM_LEN, Frame};
use super::grammar::yes_no;
use super::numeric::{Amount, Percentage};
use crate::error::{NovitusError, Result};

/// Length of the reply type tag.
pub const TAG_LEN: usize = 3;

/// Number of tax rate slots (A..G).
pub const PTU_SLOTS: usize = 7;

/// Tax rate slot letters, in wire order.
pub const PTU_NAMES: [char; PTU_SLOTS] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];

/// A decoded reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Answer to the error query; `0` means no error
    ErrorCode(u32),
    /// Answer to the cash register data query
    CashRegister(CashRegisterSnapshot),
}

type ParseFn = fn(&[u8], CodePage) -> Result<Reply>;

/// Known reply tags and their parsers.
const PARSERS: [(&[u8; TAG_LEN], ParseFn); 2] = [
    (b"1#E", parse_error_code),
    (b"2#X", parse_cash_register),
];

impl Reply {
    /// Decode an unwrapped reply body (frame markers already stripped).
    ///
    /// ## Errors
    ///
    /// [`NovitusError::ReplyNotImplemented`] for an unknown tag or a record
    /// that does not match the tag's layout.
    pub fn parse(body: &[u8], code_page: CodePage) -> Result<Reply> {
        if body.len() < TAG_LEN {
            return Err(NovitusError::reply_not_implemented(format!(
                "Reply too short for a type tag: {:?}",
                String::from_utf8_lossy(body)
            )));
        }
        let (tag, rest) = body.split_at(TAG_LEN);

        let parser = PARSERS
            .iter()
            .find(|(known, _)| known.as_slice() == tag)
            .map(|(_, parser)| *parser)
            .ok_or_else(|| {
                NovitusError::reply_not_implemented(format!(
                    "Unknown reply type {:?}",
                    String::from_utf8_lossy(tag)
                ))
            })?;

        parser(rest, code_page)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Reply::ErrorCode(_) => "1#E",
            Reply::CashRegister(_) => "2#X",
        }
    }
}

fn parse_error_code(rest: &[u8], _code_page: CodePage) -> Result<Reply> {
    let text = std::str::from_utf8(rest).unwrap_or_default();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NovitusError::reply_not_implemented(format!(
            "Malformed error number {:?}",
            String::from_utf8_lossy(rest)
        )));
    }
    text.parse().map(Reply::ErrorCode).map_err(|e| {
        NovitusError::reply_not_implemented(format!("Error number {}: {}", text, e))
    })
}

fn parse_cash_register(rest: &[u8], code_page: CodePage) -> Result<Reply> {
    if rest.len() < CHECKSUM_LEN {
        return Err(malformed("missing checksum"));
    }
    // The checksum covers the tag as well as the record
    let mut covered = b"2#X".to_vec();
    covered.extend_from_slice(rest);
    let frame = Frame::split(&covered)?;
    frame.verify();

    let record = &frame.payload[TAG_LEN..];
    CashRegisterSnapshot::parse(record, code_page).map(Reply::CashRegister)
}

fn malformed(detail: &str) -> NovitusError {
    NovitusError::reply_not_implemented(format!("Cash register data: {}", detail))
}

// ============================================================================
// CASH REGISTER DATA
// ============================================================================

/// # Cash Register Snapshot
///
/// One decoded `2#X` record. Built fresh per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashRegisterSnapshot {
    pub last_command_error: bool,
    pub fiscal: bool,
    pub in_transaction: bool,
    pub last_transaction_error: bool,
    pub zeroing_count: u32,
    pub date: NaiveDate,
    pub ptu: [Percentage; PTU_SLOTS],
    pub receipt_count: u32,
    pub totals: [Amount; PTU_SLOTS],
    pub cash: Amount,
    pub serial_number: String,
}

impl CashRegisterSnapshot {
    /// Parse the record that follows the `2#X` tag, checksum removed.
    pub fn parse(record: &[u8], code_page: CodePage) -> Result<Self> {
        let slash = record
            .iter()
            .position(|&b| b == b'/')
            .ok_or_else(|| malformed("no '/' after the header"))?;
        let head =
            std::str::from_utf8(&record[..slash]).map_err(|_| malformed("header is not ASCII"))?;
        let tail = &record[slash + 1..];

        // flags(4) ; separator ; zeroing ; yy ; mm ; dd
        let head: Vec<&str> = head.split(';').collect();
        let [f0, f1, f2, f3, separator, zeroing, yy, mm, dd] = head.as_slice() else {
            return Err(malformed(&format!("expected 9 header fields, got {}", head.len())));
        };
        if separator.len() != 1 || !separator.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("bad separator digit"));
        }

        // PTU(7) / receipt count / TOT(7) / cash / serial
        let fields: Vec<&[u8]> = tail.splitn(2 * PTU_SLOTS + 3, |&b| b == b'/').collect();
        if fields.len() != 2 * PTU_SLOTS + 3 {
            return Err(malformed(&format!(
                "expected {} '/' fields, got {}",
                2 * PTU_SLOTS + 3,
                fields.len()
            )));
        }

        let mut ptu = [Percentage::Unused; PTU_SLOTS];
        for (slot, raw) in ptu.iter_mut().zip(&fields[..PTU_SLOTS]) {
            *slot = Percentage::from_wire(raw, code_page)?;
        }

        let receipt_count = counter(ascii(fields[PTU_SLOTS])?)?;

        let mut totals = [Amount::ZERO; PTU_SLOTS];
        for (total, raw) in totals.iter_mut().zip(&fields[PTU_SLOTS + 1..2 * PTU_SLOTS + 1]) {
            *total = Amount::parse_wire(ascii(raw)?)?;
        }

        let cash = Amount::parse_wire(ascii(fields[2 * PTU_SLOTS + 1])?)?;
        let serial_number = code_page.decode(fields[2 * PTU_SLOTS + 2]);

        Ok(Self {
            last_command_error: bit(f0)?,
            fiscal: bit(f1)?,
            in_transaction: bit(f2)?,
            last_transaction_error: bit(f3)?,
            zeroing_count: counter(zeroing)?,
            date: date(yy, mm, dd)?,
            ptu,
            receipt_count,
            totals,
            cash,
            serial_number,
        })
    }

    /// Tax rate for slot `A`..`G`.
    pub fn ptu(&self, slot: char) -> Option<Percentage> {
        slot_index(slot).map(|i| self.ptu[i])
    }

    /// Running total for slot `A`..`G`.
    pub fn total(&self, slot: char) -> Option<Amount> {
        slot_index(slot).map(|i| self.totals[i])
    }

    /// Tax rate slots paired with their letters.
    pub fn tax_rates(&self) -> Vec<(char, Percentage)> {
        PTU_NAMES.iter().copied().zip(self.ptu).collect()
    }

    /// Named fields as printable text, in record order.
    ///
    /// Names follow the device documentation (`PTU_A`, `TOT_A`, ...).
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("lastcommanderror".to_string(), yes_no(self.last_command_error).to_string()),
            ("fiscal".to_string(), yes_no(self.fiscal).to_string()),
            ("intransaction".to_string(), yes_no(self.in_transaction).to_string()),
            (
                "lasttransactionerror".to_string(),
                yes_no(self.last_transaction_error).to_string(),
            ),
            ("zeroingcount".to_string(), self.zeroing_count.to_string()),
            ("date".to_string(), self.date.format("%Y-%m-%d").to_string()),
        ];
        for (name, rate) in PTU_NAMES.iter().zip(&self.ptu) {
            out.push((format!("PTU_{}", name), rate.to_string()));
        }
        out.push(("receiptcount".to_string(), self.receipt_count.to_string()));
        for (name, total) in PTU_NAMES.iter().zip(&self.totals) {
            out.push((format!("TOT_{}", name), total.to_string()));
        }
        out.push(("cash".to_string(), self.cash.to_string()));
        out.push(("serialno".to_string(), self.serial_number.clone()));
        out
    }
}

fn slot_index(slot: char) -> Option<usize> {
    PTU_NAMES.iter().position(|&c| c == slot.to_ascii_uppercase())
}

fn ascii(raw: &[u8]) -> Result<&str> {
    std::str::from_utf8(raw)
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| malformed("non-ASCII numeric field"))
}

fn bit(field: &str) -> Result<bool> {
    match field {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(malformed(&format!("flag {:?} is not 0 or 1", other))),
    }
}

fn counter(field: &str) -> Result<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(&format!("counter {:?} is not a number", field)));
    }
    field
        .parse()
        .map_err(|_| malformed(&format!("counter {:?} out of range", field)))
}

fn date(yy: &str, mm: &str, dd: &str) -> Result<NaiveDate> {
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !(two_digits(yy) && two_digits(mm) && two_digits(dd)) {
        return Err(malformed("date fields must be two digits"));
    }
    let parse = |s: &str| s.parse::<u32>().map_err(|_| malformed("date"));
    let year = 2000 + parse(yy)? as i32;
    NaiveDate::from_ymd_opt(year, parse(mm)?, parse(dd)?)
        .ok_or_else(|| malformed(&format!("invalid date {}-{}-{}", yy, mm, dd)))
}
