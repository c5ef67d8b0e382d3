//! # Frame Checksum
//!
//! Every frame carries a one-byte XOR digest of its payload, sent as two
//! uppercase hex characters just before the closing `ESC \`.
//!
//! ```text
//! acc = 0xFF
//! for byte in payload: acc ^= byte
//! digest = format!("{:02X}", acc)
//! ```
//!
//! The digest is integrity-only. The printer answers a bad digest with
//! error code 2 ("Nieprawidłowy bajt kontrolny").

/// Initial accumulator value.
pub const CHECKSUM_SEED: u8 = 0xFF;

/// XOR-fold a payload into the one-byte checksum value.
///
/// ## Example
///
/// ```
/// use novitus::protocol::checksum::checksum_value;
///
/// assert_eq!(checksum_value(b""), 0xFF);
/// assert_eq!(checksum_value(b"0#i100/"), 0x9B);
/// ```
#[inline]
pub fn checksum_value(payload: &[u8]) -> u8 {
    payload.iter().fold(CHECKSUM_SEED, |acc, &b| acc ^ b)
}

/// Hex digits in wire order.
const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Checksum of a payload as the two wire characters.
///
/// The digits are ASCII, and every [`CodePage`](super::codepage::CodePage)
/// maps the ASCII half onto itself, so the wire bytes do not depend on the
/// active page.
pub fn checksum(payload: &[u8]) -> [u8; 2] {
    let value = checksum_value(payload);
    [
        HEX_DIGITS[usize::from(value >> 4)],
        HEX_DIGITS[usize::from(value & 0x0F)],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codepage::CodePage;

    #[test]
    fn test_empty_payload() {
        assert_eq!(checksum(b""), *b"FF");
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(checksum(b"0#i100/"), *b"9B");
    }

    #[test]
    fn test_uppercase_and_zero_padded() {
        // 0xFF ^ 0xF0 = 0x0F
        assert_eq!(checksum(&[0xF0]), *b"0F");
        // 0xFF ^ 0x55 = 0xAA
        assert_eq!(checksum(&[0x55]), *b"AA");
    }

    #[test]
    fn test_hex_digits_encode_to_themselves() {
        for page in [CodePage::Mazovia, CodePage::Windows1250] {
            for &digit in HEX_DIGITS {
                assert_eq!(page.encode_char(digit as char), Some(digit), "{page}");
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let payload = b"0;1$hTEST\r";
        assert_eq!(checksum_value(payload), checksum_value(payload));
    }

    #[test]
    fn test_content_sensitive() {
        assert_ne!(checksum_value(b"#i100/"), checksum_value(b"#i200/"));
        assert_ne!(checksum_value(b"1$e"), checksum_value(b"0$e"));
    }
}
