//! # Novitus Protocol Commands
//!
//! This module defines the command model and the device-level commands that
//! are not part of a fiscal document (error handling, queries, drawer, cash
//! movements). Receipt and invoice commands live in [`crate::receipt`].
//!
//! ## Protocol Overview
//!
//! Two kinds of traffic share the serial line:
//!
//! - **Control bytes**: single raw bytes (`DLE`, `ENQ`, `BEL`, `CAN`) with no
//!   framing and no checksum. `DLE` and `ENQ` are answered with one status
//!   byte (see [`super::status`]).
//! - **Framed commands**: an opcode with parameter and text tokens, wrapped
//!   by [`super::frame`].
//!
//! ## Opcodes
//!
//! | Opcode | Command | Reply |
//! |--------|---------|-------|
//! | `#e` | Set error handling mode | - |
//! | `#n` | Error number query | `1#E<code>` |
//! | `#s` | Cash register data query | `2#X...` |
//! | `#i` | Cash in | - |
//! | `#d` | Cash out | - |
//! | `$h` | Begin receipt | - |
//! | `$l` | Item line | - |
//! | `$n` | Discount / markup | - |
//! | `$b` | Payment | - |
//! | `$e` | Close / cancel receipt or invoice | - |
//! | `$f` | Begin invoice | - |
//! | `$w` | Non-fiscal printout | - |
//! | `$d` | Open drawer | - |
//!
//! The `#d`, `$b`, `$f` and `$w` layouts, and the `;1` invoice flag on `$e`,
//! have not been checked against a device or the vendor protocol manual. They
//! follow the pattern of their neighbours and are pinned only by this crate's
//! own tests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::codepage::CodePage;
use super::frame::build_frame;
use super::grammar;
use crate::error::{NovitusError, Result};

// ============================================================================
// CONTROL BYTES
// ============================================================================

/// DLE (Data Link Escape) - device status query
pub const DLE: u8 = 0x10;

/// ENQ (Enquiry) - transaction status query
pub const ENQ: u8 = 0x05;

/// BEL (Bell) - sound the buzzer
pub const BEL: u8 = 0x07;

/// CAN (Cancel) - abort the command being received
pub const CAN: u8 = 0x18;

// ============================================================================
// OPCODES
// ============================================================================

pub mod opcode {
    //! Two-character command opcodes. Entries marked unverified have no
    //! device or manual reference yet.

    pub const SET_ERROR_HANDLING: &str = "#e";
    pub const ERROR_QUERY: &str = "#n";
    pub const CASH_REGISTER_DATA: &str = "#s";
    pub const CASH_IN: &str = "#i";
    /// Unverified.
    pub const CASH_OUT: &str = "#d";
    pub const RECEIPT_BEGIN: &str = "$h";
    pub const ITEM: &str = "$l";
    pub const DISCOUNT: &str = "$n";
    /// Unverified.
    pub const PAYMENT: &str = "$b";
    pub const DOCUMENT_END: &str = "$e";
    /// Unverified.
    pub const INVOICE_BEGIN: &str = "$f";
    /// Unverified.
    pub const NONFISCAL: &str = "$w";
    pub const DRAWER: &str = "$d";
}

/// Cash register data mode for the general status report.
pub const CASH_REGISTER_MODE: u8 = 21;

/// Cash register data mode that includes the programmed tax rates.
pub const TAX_RATES_MODE: u8 = 22;

// ============================================================================
// COMMAND
// ============================================================================

/// # Command
///
/// An opcode with ordered parameter and text tokens.
///
/// Token order is significant: the device parses positionally and counts
/// fields, so optional blocks must be appended exactly where the command
/// layout expects them.
///
/// Numbers go in through [`Command::number`] and [`Command::param_number`].
/// A NaN or infinite value is remembered and makes [`Command::encode`] fail,
/// so a builder never has to return a `Result` itself.
///
/// ```
/// use novitus::protocol::{codepage::CodePage, commands::Command};
///
/// let cmd = Command::new("#i").param("0").text("100/");
/// assert_eq!(cmd.encode(CodePage::Mazovia)?, b"\x1bP0#i100/9B\x1b\\");
/// # Ok::<(), novitus::NovitusError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    opcode: String,
    parameters: Vec<String>,
    texts: Vec<String>,
    invalid: Option<String>,
}

impl Command {
    pub fn new(opcode: impl Into<String>) -> Self {
        Self {
            opcode: opcode.into(),
            parameters: Vec::new(),
            texts: Vec::new(),
            invalid: None,
        }
    }

    /// Append a parameter token.
    pub fn param(mut self, token: impl Into<String>) -> Self {
        self.parameters.push(token.into());
        self
    }

    /// Append a text token.
    pub fn text(mut self, token: impl Into<String>) -> Self {
        self.texts.push(token.into());
        self
    }

    /// Append a number field (`12.50/`) to the texts.
    pub fn number(mut self, value: f64) -> Self {
        self.push_number(value);
        self
    }

    /// Append a number as a bare parameter token (`5`, `2.5`).
    pub fn param_number(mut self, value: f64) -> Self {
        self.check_finite(value);
        self.parameters.push(value.to_string());
        self
    }

    pub fn push_number(&mut self, value: f64) {
        self.check_finite(value);
        self.texts.push(grammar::number(value));
    }

    fn check_finite(&mut self, value: f64) {
        if !value.is_finite() && self.invalid.is_none() {
            self.invalid = Some(format!("{} is not a valid amount for {}", value, self.opcode));
        }
    }

    pub fn push_param(&mut self, token: impl Into<String>) {
        self.parameters.push(token.into());
    }

    pub fn push_text(&mut self, token: impl Into<String>) {
        self.texts.push(token.into());
    }

    pub fn opcode(&self) -> &str {
        &self.opcode
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// The command text as the device will parse it, before encoding.
    pub fn body(&self) -> String {
        let mut body = self.parameters.concat();
        body.push_str(&self.opcode);
        body.push_str(&self.texts.concat());
        body
    }

    /// Serialize into a wire frame.
    ///
    /// ## Errors
    ///
    /// - [`NovitusError::InvalidToken`] if a number was NaN or infinite, or a
    ///   token contains ESC
    /// - [`NovitusError::Encoding`] if a character is outside `code_page`
    pub fn encode(&self, code_page: CodePage) -> Result<Vec<u8>> {
        if let Some(reason) = &self.invalid {
            return Err(NovitusError::InvalidToken(reason.clone()));
        }
        build_frame(&self.opcode, &self.parameters, &self.texts, code_page)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body().escape_debug())
    }
}

// ============================================================================
// DEVICE COMMANDS
// ============================================================================

/// How the printer reacts to a rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorHandling {
    /// Show the error on the display and wait for a key press
    Display,
    /// Record the error silently (read it back with `#n`)
    Silent,
    /// Recover automatically, showing the error
    AutoWithDisplay,
    /// Recover automatically, silently
    AutoWithoutDisplay,
}

impl ErrorHandling {
    pub fn code(self) -> &'static str {
        match self {
            ErrorHandling::Display => "0",
            ErrorHandling::Silent => "1",
            ErrorHandling::AutoWithDisplay => "2",
            ErrorHandling::AutoWithoutDisplay => "3",
        }
    }
}

impl FromStr for ErrorHandling {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "display" => Ok(ErrorHandling::Display),
            "silent" => Ok(ErrorHandling::Silent),
            "auto-with-display" | "autowithdisplay" => Ok(ErrorHandling::AutoWithDisplay),
            "auto-without-display" | "autowithoutdisplay" => Ok(ErrorHandling::AutoWithoutDisplay),
            other => Err(format!(
                "Unknown error handling mode '{}'. Use display, silent, \
                 auto-with-display or auto-without-display",
                other
            )),
        }
    }
}

/// # Set Error Handling (`#e`)
///
/// `silent` is what host software normally wants: errors are not shown on
/// the printer and are read back with [`error_query`].
pub fn set_error_handling(mode: ErrorHandling) -> Command {
    Command::new(opcode::SET_ERROR_HANDLING).param(mode.code())
}

/// # Error Number Query (`#n`)
///
/// Answered with a `1#E<code>` frame; `0` means the last command succeeded.
pub fn error_query() -> Command {
    Command::new(opcode::ERROR_QUERY)
}

/// # Cash Register Data Query (`#s`)
///
/// `mode` selects the report; see [`CASH_REGISTER_MODE`] and
/// [`TAX_RATES_MODE`].
pub fn cash_register_data(mode: u8) -> Command {
    Command::new(opcode::CASH_REGISTER_DATA).param(mode.to_string())
}

/// # Cash In (`#i`)
pub fn cash_in(amount: f64) -> Command {
    Command::new(opcode::CASH_IN)
        .param("0")
        .number(amount)
}

/// # Cash Out (`#d`)
pub fn cash_out(amount: f64) -> Command {
    Command::new(opcode::CASH_OUT)
        .param("0")
        .number(amount)
}

/// # Open Drawer (`$d`)
pub fn open_drawer() -> Command {
    Command::new(opcode::DRAWER).param("1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_body_order() {
        let cmd = Command::new("$e").param("1;").param("0").text("Jan\r");
        assert_eq!(cmd.body(), "1;0$eJan\r");
        assert_eq!(cmd.opcode(), "$e");
        assert_eq!(cmd.parameters(), &["1;", "0"]);
        assert_eq!(cmd.texts(), &["Jan\r"]);
    }

    #[test]
    fn test_push_matches_chaining() {
        let mut pushed = Command::new("$h");
        pushed.push_param("0");
        pushed.push_text("A\r");
        assert_eq!(pushed, Command::new("$h").param("0").text("A\r"));
    }

    #[test]
    fn test_display_escapes_control_chars() {
        let cmd = Command::new("$h").param("0").text("A\r");
        assert_eq!(cmd.to_string(), "0$hA\\r");
    }

    #[test]
    fn test_set_error_handling() {
        assert_eq!(set_error_handling(ErrorHandling::Silent).body(), "1#e");
        assert_eq!(set_error_handling(ErrorHandling::Display).body(), "0#e");
        assert_eq!(set_error_handling(ErrorHandling::AutoWithoutDisplay).body(), "3#e");
    }

    #[test]
    fn test_error_handling_from_str() {
        assert_eq!("silent".parse::<ErrorHandling>(), Ok(ErrorHandling::Silent));
        assert_eq!(
            "autowithdisplay".parse::<ErrorHandling>(),
            Ok(ErrorHandling::AutoWithDisplay)
        );
        assert!("loud".parse::<ErrorHandling>().is_err());
    }

    #[test]
    fn test_queries() {
        assert_eq!(error_query().encode(CodePage::Mazovia).unwrap(), b"\x1bP#nB2\x1b\\");
        assert_eq!(cash_register_data(CASH_REGISTER_MODE).body(), "21#s");
        assert_eq!(cash_register_data(TAX_RATES_MODE).body(), "22#s");
    }

    #[test]
    fn test_cash_movements() {
        assert_eq!(cash_in(100.0).body(), "0#i100.00/");
        assert_eq!(cash_out(12.5).body(), "0#d12.50/");
    }

    #[test]
    fn test_non_finite_amounts_fail_to_encode() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = cash_in(value).encode(CodePage::Mazovia).unwrap_err();
            assert!(matches!(err, NovitusError::InvalidToken(_)), "{value}");
        }
        let err = Command::new("$e")
            .param_number(f64::NAN)
            .encode(CodePage::Mazovia)
            .unwrap_err();
        assert!(matches!(err, NovitusError::InvalidToken(_)));
    }

    #[test]
    fn test_number_builders() {
        let cmd = Command::new("$e").param("1;").param_number(5.0).number(12.5);
        assert_eq!(cmd.body(), "1;5$e12.50/");
        assert!(cmd.encode(CodePage::Mazovia).is_ok());
    }

    #[test]
    fn test_open_drawer() {
        assert_eq!(open_drawer().body(), "1$d");
    }
}
