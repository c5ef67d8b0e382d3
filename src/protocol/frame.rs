//! # Frame Codec
//!
//! Every command sent to the printer travels in one escape-delimited frame:
//!
//! ```text
//! ESC P  <parameters> <opcode> <texts>  <checksum>  ESC \
//! 1B 50  ......... payload .........    XX XX       1B 5C
//! ```
//!
//! The payload is the command text encoded through the active code page.
//! Parameters come *before* the two-character opcode and texts after it; the
//! device parses all of it positionally.
//!
//! ## Example
//!
//! ```
//! use novitus::protocol::{codepage::CodePage, frame};
//!
//! let bytes = frame::build_frame("#i", &["0"], &["100/"], CodePage::Mazovia)?;
//! assert_eq!(bytes, b"\x1bP0#i100/9B\x1b\\");
//! # Ok::<(), novitus::NovitusError>(())
//! ```
//!
//! Replies use the same markers. Some reply types carry a checksum and some
//! do not, so unwrapping (stripping markers) and checksum splitting are
//! separate steps.

use tracing::warn;

use super::checksum::checksum;
use super::codepage::CodePage;
use crate::error::{NovitusError, Result};

/// ESC (Escape) - frame marker prefix
pub const ESC: u8 = 0x1B;

/// Frame start marker (`ESC P`)
pub const FRAME_START: [u8; 2] = [ESC, b'P'];

/// Frame end marker (`ESC \`)
pub const FRAME_END: [u8; 2] = [ESC, b'\\'];

/// Length of the hex checksum trailer.
pub const CHECKSUM_LEN: usize = 2;

/// # Frame
///
/// An encoded payload and its two-character checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: Vec<u8>,
    pub checksum: [u8; 2],
}

impl Frame {
    /// Wrap an encoded payload, computing its checksum.
    ///
    /// ## Errors
    ///
    /// [`NovitusError::InvalidToken`] if the payload contains an ESC byte.
    /// `ESC P` and `ESC \` are reserved for framing, and a stray ESC could
    /// form either marker together with the following token.
    pub fn new(payload: Vec<u8>) -> Result<Self> {
        if let Some(pos) = payload.iter().position(|&b| b == ESC) {
            return Err(NovitusError::InvalidToken(format!(
                "ESC byte at payload offset {} would corrupt the frame",
                pos
            )));
        }
        let checksum = checksum(&payload);
        Ok(Self { payload, checksum })
    }

    /// Split a reply body into payload and its trailing checksum.
    ///
    /// The checksum is not verified here; see [`Frame::is_valid`].
    pub fn split(body: &[u8]) -> Result<Self> {
        if body.len() < CHECKSUM_LEN {
            return Err(NovitusError::communication(format!(
                "Reply too short to carry a checksum ({} bytes)",
                body.len()
            )));
        }
        let (payload, digest) = body.split_at(body.len() - CHECKSUM_LEN);
        Ok(Self {
            payload: payload.to_vec(),
            checksum: [digest[0], digest[1]],
        })
    }

    /// Whether the carried checksum matches the payload.
    pub fn is_valid(&self) -> bool {
        checksum(&self.payload) == self.checksum
    }

    /// Check the carried checksum, logging a warning on mismatch.
    ///
    /// Verification of device-originated frames is advisory: the payload is
    /// still returned to the caller.
    pub fn verify(&self) -> bool {
        let valid = self.is_valid();
        if !valid {
            warn!(
                received = %String::from_utf8_lossy(&self.checksum),
                expected = %String::from_utf8_lossy(&checksum(&self.payload)),
                "Reply checksum mismatch"
            );
        }
        valid
    }

    /// Serialize to wire bytes (`ESC P payload checksum ESC \`).
    pub fn to_bytes(&self) -> Vec<u8> {
        let capacity = FRAME_START.len() + self.payload.len() + CHECKSUM_LEN + FRAME_END.len();
        let mut out = Vec::with_capacity(capacity);
        out.extend_from_slice(&FRAME_START);
        out.extend_from_slice(&self.payload);
        out.extend_from_slice(&self.checksum);
        out.extend_from_slice(&FRAME_END);
        out
    }
}

/// Build a complete command frame.
///
/// Concatenates `parameters`, then `opcode`, then `texts`, encodes the result
/// strictly through `code_page` and appends the checksum. Either token list
/// may be empty.
///
/// ## Errors
///
/// - [`NovitusError::Encoding`] if any character is outside the code page
/// - [`NovitusError::InvalidToken`] if a token contains ESC
///
/// Nothing is returned on error, so a partial frame can never be written.
pub fn build_frame<P, T>(
    opcode: &str,
    parameters: &[P],
    texts: &[T],
    code_page: CodePage,
) -> Result<Vec<u8>>
where
    P: AsRef<str>,
    T: AsRef<str>,
{
    let mut body = String::new();
    for param in parameters {
        body.push_str(param.as_ref());
    }
    body.push_str(opcode);
    for text in texts {
        body.push_str(text.as_ref());
    }

    let payload = code_page.encode(&body)?;
    Ok(Frame::new(payload)?.to_bytes())
}

/// Strip the frame markers from a received buffer.
///
/// Returns the bytes between the first `ESC P` and the last `ESC \`.
/// Anything the port delivered before the start marker is ignored.
///
/// ## Errors
///
/// [`NovitusError::Communication`] if either marker is missing.
pub fn unwrap_reply(raw: &[u8]) -> Result<&[u8]> {
    let start = find(raw, &FRAME_START)
        .ok_or_else(|| NovitusError::communication("Garbled reply: missing frame start"))?
        + FRAME_START.len();

    let end = rfind(&raw[start..], &FRAME_END)
        .ok_or_else(|| NovitusError::communication("Garbled reply: missing frame end"))?
        + start;

    Ok(&raw[start..end])
}

/// Render bytes as space-separated lowercase hex, for logs and the CLI.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn find(data: &[u8], needle: &[u8]) -> Option<usize> {
    data.windows(needle.len()).position(|window| window == needle)
}

fn rfind(data: &[u8], needle: &[u8]) -> Option<usize> {
    data.windows(needle.len()).rposition(|window| window == needle)
}
