//! # Command Grammar
//!
//! Token formatting rules shared by every command.
//!
//! | Field | Format | Example |
//! |-------|--------|---------|
//! | Number in a text body | two decimals + `/` | `12.50/` |
//! | Text line | text + CR | `Kawa\r` |
//! | Protocol flag | `0` / `1` | `1` |
//! | Discount/markup value | number, `%` stripped | `10%` → `10` |
//!
//! Tokens are concatenated without separators. Commands that need `;`
//! between parameter fields carry the `;` inside their own tokens.

/// Number field terminator
pub const NUMBER_TERMINATOR: char = '/';

/// Text line terminator
pub const LINE_TERMINATOR: char = '\r';

/// Format a number field: two decimals followed by `/`.
///
/// ```
/// use novitus::protocol::grammar::number;
///
/// assert_eq!(number(12.5), "12.50/");
/// assert_eq!(number(3.0), "3.00/");
/// ```
pub fn number(value: f64) -> String {
    format!("{:.2}{}", value, NUMBER_TERMINATOR)
}

/// Format a text line: the text followed by CR.
pub fn line(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    out.push_str(text);
    out.push(LINE_TERMINATOR);
    out
}

/// Format a protocol flag.
#[inline]
pub fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Human-readable flag, for display only. Never sent to the device.
#[inline]
pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Whether a discount or markup value is relative or absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Percent,
    Amount,
}

impl ValueKind {
    /// Split a caller value like `"10%"` or `"5.00"` into its kind and the
    /// text to put on the wire.
    ///
    /// ```
    /// use novitus::protocol::grammar::ValueKind;
    ///
    /// assert_eq!(ValueKind::parse("10%"), (ValueKind::Percent, "10"));
    /// assert_eq!(ValueKind::parse("5.00"), (ValueKind::Amount, "5.00"));
    /// ```
    pub fn parse(value: &str) -> (ValueKind, &str) {
        let value = value.trim();
        match value.strip_suffix('%') {
            Some(number) => (ValueKind::Percent, number.trim_end_matches('%')),
            None => (ValueKind::Amount, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_rounds_to_two_decimals() {
        assert_eq!(number(0.0), "0.00/");
        assert_eq!(number(810.189), "810.19/");
        assert_eq!(number(100.0), "100.00/");
    }

    #[test]
    fn test_line() {
        assert_eq!(line("Jan Kowalski"), "Jan Kowalski\r");
        assert_eq!(line(""), "\r");
    }

    #[test]
    fn test_flag() {
        assert_eq!(flag(true), "1");
        assert_eq!(flag(false), "0");
        assert_eq!(yes_no(true), "yes");
        assert_eq!(yes_no(false), "no");
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(ValueKind::parse("20%"), (ValueKind::Percent, "20"));
        assert_eq!(ValueKind::parse("2.50%"), (ValueKind::Percent, "2.50"));
        assert_eq!(ValueKind::parse("2.50"), (ValueKind::Amount, "2.50"));
        assert_eq!(ValueKind::parse(" 7% "), (ValueKind::Percent, "7"));
    }
}
