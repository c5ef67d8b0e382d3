//! # Fixed-Point Values
//!
//! Amounts, quantities and tax rates cross the wire as decimal text with two
//! fractional digits (`"810.19"`, `"08.00"`). [`Amount`] keeps them exact as
//! signed hundredths instead of going through floating point.
//!
//! Tax rate slots reserve two values as markers rather than rates:
//!
//! | Wire value | Meaning |
//! |------------|---------|
//! | `100.00` | [`Percentage::Free`]: tax-exempt slot |
//! | `101.00` | [`Percentage::Unused`]: slot not programmed |

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::codepage::CodePage;
use crate::error::{NovitusError, Result};

/// A decimal value with exactly two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Parse a wire field: digits, a dot and exactly two digits.
    ///
    /// Stricter than [`FromStr`], which also accepts caller-typed values
    /// such as `"12"` or `"4.5"`.
    pub fn parse_wire(s: &str) -> Result<Self> {
        let shape_ok = match s.split_once('.') {
            Some((int, frac)) => {
                !int.is_empty()
                    && int.bytes().all(|b| b.is_ascii_digit())
                    && frac.len() == 2
                    && frac.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        };
        if !shape_ok {
            return Err(NovitusError::reply_not_implemented(format!(
                "Malformed amount field '{}'",
                s
            )));
        }
        s.parse().map_err(NovitusError::ReplyNotImplemented)
    }
}

impl FromStr for Amount {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || format!("Invalid amount '{}'", s);

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if (int.is_empty() && frac.is_empty())
            || frac.len() > 2
            || !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if int.is_empty() {
            0
        } else {
            int.parse().map_err(|_| invalid())?
        };
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let value = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// TAX RATES
// ============================================================================

/// A tax rate slot value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Percentage {
    /// A genuine rate, e.g. 23.00%
    Rate(Amount),
    /// Tax-exempt slot (wire `100.00`)
    Free,
    /// Slot not in use (wire `101.00`)
    Unused,
}

impl Percentage {
    /// Interpret a percentage string such as `"23.00%"`.
    ///
    /// `"100.00%"` and `"101.00%"` map to [`Percentage::Free`] and
    /// [`Percentage::Unused`]; everything else must be a number followed by
    /// `%`.
    ///
    /// ```
    /// use novitus::protocol::numeric::Percentage;
    ///
    /// assert_eq!(Percentage::interpret("100.00%")?, Percentage::Free);
    /// assert_eq!(Percentage::interpret("101.00%")?, Percentage::Unused);
    /// assert_eq!(Percentage::interpret("23.00%")?.to_string(), "23.00%");
    /// # Ok::<(), novitus::NovitusError>(())
    /// ```
    pub fn interpret(text: &str) -> Result<Self> {
        match text {
            "100.00%" => Ok(Percentage::Free),
            "101.00%" => Ok(Percentage::Unused),
            _ => {
                let number = text.strip_suffix('%').ok_or_else(|| {
                    NovitusError::reply_not_implemented(format!("Malformed percentage '{}'", text))
                })?;
                number
                    .parse()
                    .map(Percentage::Rate)
                    .map_err(NovitusError::ReplyNotImplemented)
            }
        }
    }

    /// Interpret a raw PTU field from a reply.
    ///
    /// Leading zero padding is stripped (`"08.00"` reads as `8.00%`), the
    /// rest is decoded through the code page and given a `%` suffix before
    /// [`Percentage::interpret`].
    pub fn from_wire(raw: &[u8], code_page: CodePage) -> Result<Self> {
        let start = raw.iter().position(|&b| b != b'0').unwrap_or(raw.len());
        let mut text = code_page.decode(&raw[start..]);
        text.push('%');
        Self::interpret(&text)
    }

    /// The rate, if this slot holds one.
    pub fn rate(self) -> Option<Amount> {
        match self {
            Percentage::Rate(amount) => Some(amount),
            _ => None,
        }
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Percentage::Rate(amount) => write!(f, "{}%", amount),
            Percentage::Free => f.write_str("free"),
            Percentage::Unused => f.write_str("unused"),
        }
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_hundredths(81019).to_string(), "810.19");
        assert_eq!(Amount::from_hundredths(5).to_string(), "0.05");
        assert_eq!(Amount::from_hundredths(-150).to_string(), "-1.50");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_amount_parse() {
        assert_eq!("810.19".parse::<Amount>().unwrap().hundredths(), 81019);
        assert_eq!("08.00".parse::<Amount>().unwrap().hundredths(), 800);
        assert_eq!("12".parse::<Amount>().unwrap().hundredths(), 1200);
        assert_eq!("4.5".parse::<Amount>().unwrap().hundredths(), 450);
        assert_eq!(".00".parse::<Amount>().unwrap(), Amount::ZERO);
        assert_eq!("-2.25".parse::<Amount>().unwrap().hundredths(), -225);
    }

    #[test]
    fn test_amount_parse_rejects_garbage() {
        for bad in ["", ".", "1.234", "1,50", "abc", "1.2x", "--1"] {
            assert!(bad.parse::<Amount>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_amount_parse_wire_is_strict() {
        assert_eq!(Amount::parse_wire("0.00").unwrap(), Amount::ZERO);
        assert!(Amount::parse_wire("12").is_err());
        assert!(Amount::parse_wire("4.5").is_err());
        assert!(Amount::parse_wire(".00").is_err());
        assert!(matches!(
            Amount::parse_wire("-1.00"),
            Err(NovitusError::ReplyNotImplemented(_))
        ));
    }

    #[test]
    fn test_interpret_sentinels() {
        assert_eq!(Percentage::interpret("100.00%").unwrap(), Percentage::Free);
        assert_eq!(Percentage::interpret("101.00%").unwrap(), Percentage::Unused);
    }

    #[test]
    fn test_interpret_rate_unchanged() {
        let rate = Percentage::interpret("23.00%").unwrap();
        assert_eq!(rate, Percentage::Rate(Amount::from_hundredths(2300)));
        assert_eq!(rate.to_string(), "23.00%");
    }

    #[test]
    fn test_interpret_rejects_missing_suffix() {
        assert!(Percentage::interpret("23.00").is_err());
        assert!(Percentage::interpret("n/a%").is_err());
    }

    #[test]
    fn test_from_wire_strips_padding() {
        let page = CodePage::Mazovia;
        assert_eq!(Percentage::from_wire(b"08.00", page).unwrap().to_string(), "8.00%");
        assert_eq!(Percentage::from_wire(b"23.00", page).unwrap().to_string(), "23.00%");
        assert_eq!(Percentage::from_wire(b"00.00", page).unwrap().to_string(), "0.00%");
        assert_eq!(Percentage::from_wire(b"100.00", page).unwrap(), Percentage::Free);
        assert_eq!(Percentage::from_wire(b"101.00", page).unwrap(), Percentage::Unused);
    }

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::Free.to_string(), "free");
        assert_eq!(Percentage::Unused.to_string(), "unused");
        assert_eq!(Percentage::Free.rate(), None);
        assert_eq!(
            Percentage::Rate(Amount::from_hundredths(500)).rate(),
            Some(Amount::from_hundredths(500))
        );
    }
}
