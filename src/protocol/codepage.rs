//! # National Code Pages
//!
//! Converts between Unicode strings and the single-byte encodings understood
//! by Novitus fiscal printers.
//!
//! The printer renders every text field through its configured code page, so
//! the page selected here must match the device setting or all non-ASCII text
//! is silently corrupted on paper. ASCII (U+0000–U+007F) passes through
//! unchanged in every page; the upper half (0x80–0xFF) comes from a static
//! 128-entry table.
//!
//! | Page | Upper half |
//! |------|------------|
//! | Mazovia (default) | Polish letters, CP437 box drawing and math glyphs |
//! | Windows-1250 | Central European letters and typographic punctuation |
//!
//! Both tables are bijections over all 256 byte values, so
//! `decode(encode(s)) == s` for every representable string and
//! `encode(decode(b)) == b` for every byte string.
//!
//! Unlike a best-effort printer codec, [`CodePage::encode`] is strict: a
//! character with no table entry fails the whole call and nothing is emitted.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{NovitusError, Result};

/// A 256-entry single-byte character encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodePage {
    /// Mazovia, the Polish DOS page (printer factory default)
    #[default]
    #[serde(rename = "mazovia")]
    Mazovia,
    /// Windows-1250 (Central European)
    #[serde(rename = "cp1250", alias = "windows-1250")]
    Windows1250,
}

impl CodePage {
    /// All supported code pages.
    pub const ALL: [CodePage; 2] = [CodePage::Mazovia, CodePage::Windows1250];

    /// Configuration name of the page.
    pub fn name(self) -> &'static str {
        match self {
            CodePage::Mazovia => "mazovia",
            CodePage::Windows1250 => "cp1250",
        }
    }

    /// Encode a Unicode string.
    ///
    /// ## Errors
    ///
    /// [`NovitusError::Encoding`] naming the first character that has no
    /// entry in this page. No partial output is produced.
    ///
    /// ## Example
    ///
    /// ```
    /// use novitus::protocol::codepage::CodePage;
    ///
    /// assert_eq!(CodePage::Mazovia.encode("Łódź")?, vec![0x9C, 0xA2, 0x64, 0xA6]);
    /// assert!(CodePage::Mazovia.encode("€").is_err());
    /// # Ok::<(), novitus::NovitusError>(())
    /// ```
    pub fn encode(self, s: &str) -> Result<Vec<u8>> {
        s.chars()
            .map(|ch| {
                self.encode_char(ch).ok_or(NovitusError::Encoding {
                    ch,
                    code_page: self,
                })
            })
            .collect()
    }

    /// Decode bytes into a Unicode string. Never fails.
    pub fn decode(self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| self.decode_byte(b)).collect()
    }

    /// Map a single character to its byte, if the page has one.
    pub fn encode_char(self, ch: char) -> Option<u8> {
        if (ch as u32) < 0x80 {
            return Some(ch as u8);
        }
        self.reverse_table().get(&ch).copied()
    }

    /// Map a single byte to its character.
    #[inline]
    pub fn decode_byte(self, byte: u8) -> char {
        if byte < 0x80 {
            byte as char
        } else {
            self.upper_half()[(byte - 0x80) as usize]
        }
    }

    fn upper_half(self) -> &'static [char; 128] {
        match self {
            CodePage::Mazovia => &MAZOVIA,
            CodePage::Windows1250 => &WINDOWS_1250,
        }
    }

    /// Unicode → byte map for the upper half, built on first use.
    fn reverse_table(self) -> &'static HashMap<char, u8> {
        static MAZOVIA_REVERSE: OnceLock<HashMap<char, u8>> = OnceLock::new();
        static WINDOWS_1250_REVERSE: OnceLock<HashMap<char, u8>> = OnceLock::new();

        let cell = match self {
            CodePage::Mazovia => &MAZOVIA_REVERSE,
            CodePage::Windows1250 => &WINDOWS_1250_REVERSE,
        };
        cell.get_or_init(|| {
            self.upper_half()
                .iter()
                .enumerate()
                .map(|(i, &ch)| (ch, 0x80 + i as u8))
                .collect()
        })
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodePage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mazovia" => Ok(CodePage::Mazovia),
            "cp1250" | "windows-1250" | "windows1250" => Ok(CodePage::Windows1250),
            other => Err(format!(
                "Unknown code page '{}'. Use 'mazovia' or 'cp1250'",
                other
            )),
        }
    }
}

// ============================================================================
// TABLES (0x80–0xFF)
// ============================================================================

/// Mazovia upper half.
///
/// Polish letters are placed over the CP437 accented Latin slots; the
/// box drawing, Greek and math rows are identical to CP437.
#[rustfmt::skip]
static MAZOVIA: [char; 128] = [
    'Ç', // 0x80 U+00C7
    'ü', // 0x81 U+00FC
    'é', // 0x82 U+00E9
    'â', // 0x83 U+00E2
    'ä', // 0x84 U+00E4
    'à', // 0x85 U+00E0
    'ą', // 0x86 U+0105
    'ç', // 0x87 U+00E7
    'ê', // 0x88 U+00EA
    'ë', // 0x89 U+00EB
    'è', // 0x8A U+00E8
    'ï', // 0x8B U+00EF
    'î', // 0x8C U+00EE
    'ć', // 0x8D U+0107
    'Ä', // 0x8E U+00C4
    'Ą', // 0x8F U+0104

    'Ę', // 0x90 U+0118
    'ę', // 0x91 U+0119
    'ł', // 0x92 U+0142
    'ô', // 0x93 U+00F4
    'ö', // 0x94 U+00F6
    'Ć', // 0x95 U+0106
    'û', // 0x96 U+00FB
    'ù', // 0x97 U+00F9
    'Ś', // 0x98 U+015A
    'Ö', // 0x99 U+00D6
    'Ü', // 0x9A U+00DC
    '¢', // 0x9B U+00A2
    'Ł', // 0x9C U+0141
    '¥', // 0x9D U+00A5
    'ś', // 0x9E U+015B
    'ƒ', // 0x9F U+0192

    'Ź', // 0xA0 U+0179
    'Ż', // 0xA1 U+017B
    'ó', // 0xA2 U+00F3
    'Ó', // 0xA3 U+00D3
    'ń', // 0xA4 U+0144
    'Ń', // 0xA5 U+0143
    'ź', // 0xA6 U+017A
    'ż', // 0xA7 U+017C
    '¿', // 0xA8 U+00BF
    '⌐', // 0xA9 U+2310
    '¬', // 0xAA U+00AC
    '½', // 0xAB U+00BD
    '¼', // 0xAC U+00BC
    '¡', // 0xAD U+00A1
    '«', // 0xAE U+00AB
    '»', // 0xAF U+00BB

    '░', // 0xB0 U+2591
    '▒', // 0xB1 U+2592
    '▓', // 0xB2 U+2593
    '│', // 0xB3 U+2502
    '┤', // 0xB4 U+2524
    '╡', // 0xB5 U+2561
    '╢', // 0xB6 U+2562
    '╖', // 0xB7 U+2556
    '╕', // 0xB8 U+2555
    '╣', // 0xB9 U+2563
    '║', // 0xBA U+2551
    '╗', // 0xBB U+2557
    '╝', // 0xBC U+255D
    '╜', // 0xBD U+255C
    '╛', // 0xBE U+255B
    '┐', // 0xBF U+2510

    '└', // 0xC0 U+2514
    '┴', // 0xC1 U+2534
    '┬', // 0xC2 U+252C
    '├', // 0xC3 U+251C
    '─', // 0xC4 U+2500
    '┼', // 0xC5 U+253C
    '╞', // 0xC6 U+255E
    '╟', // 0xC7 U+255F
    '╚', // 0xC8 U+255A
    '╔', // 0xC9 U+2554
    '╩', // 0xCA U+2569
    '╦', // 0xCB U+2566
    '╠', // 0xCC U+2560
    '═', // 0xCD U+2550
    '╬', // 0xCE U+256C
    '╧', // 0xCF U+2567

    '╨', // 0xD0 U+2568
    '╤', // 0xD1 U+2564
    '╥', // 0xD2 U+2565
    '╙', // 0xD3 U+2559
    '╘', // 0xD4 U+2558
    '╒', // 0xD5 U+2552
    '╓', // 0xD6 U+2553
    '╫', // 0xD7 U+256B
    '╪', // 0xD8 U+256A
    '┘', // 0xD9 U+2518
    '┌', // 0xDA U+250C
    '█', // 0xDB U+2588
    '▄', // 0xDC U+2584
    '▌', // 0xDD U+258C
    '▐', // 0xDE U+2590
    '▀', // 0xDF U+2580

    'α', // 0xE0 U+03B1
    'ß', // 0xE1 U+00DF
    'Γ', // 0xE2 U+0393
    'π', // 0xE3 U+03C0
    'Σ', // 0xE4 U+03A3
    'σ', // 0xE5 U+03C3
    'µ', // 0xE6 U+00B5
    'τ', // 0xE7 U+03C4
    'Φ', // 0xE8 U+03A6
    'Θ', // 0xE9 U+0398
    'Ω', // 0xEA U+03A9
    'δ', // 0xEB U+03B4
    '∞', // 0xEC U+221E
    'φ', // 0xED U+03C6
    'ε', // 0xEE U+03B5
    '∩', // 0xEF U+2229

    '≡', // 0xF0 U+2261
    '±', // 0xF1 U+00B1
    '≥', // 0xF2 U+2265
    '≤', // 0xF3 U+2264
    '⌠', // 0xF4 U+2320
    '⌡', // 0xF5 U+2321
    '÷', // 0xF6 U+00F7
    '≈', // 0xF7 U+2248
    '°', // 0xF8 U+00B0
    '∙', // 0xF9 U+2219
    '·', // 0xFA U+00B7
    '√', // 0xFB U+221A
    'ⁿ', // 0xFC U+207F
    '²', // 0xFD U+00B2
    '■', // 0xFE U+25A0
    '\u{00A0}', // 0xFF U+00A0
];

/// Windows-1250 upper half.
///
/// The five bytes Windows-1250 leaves unassigned (0x81, 0x83, 0x88, 0x90,
/// 0x98) map to the C1 control of the same value.
#[rustfmt::skip]
static WINDOWS_1250: [char; 128] = [
    '€', // 0x80 U+20AC
    '\u{0081}', // 0x81 U+0081
    '‚', // 0x82 U+201A
    '\u{0083}', // 0x83 U+0083
    '„', // 0x84 U+201E
    '…', // 0x85 U+2026
    '†', // 0x86 U+2020
    '‡', // 0x87 U+2021
    '\u{0088}', // 0x88 U+0088
    '‰', // 0x89 U+2030
    'Š', // 0x8A U+0160
    '‹', // 0x8B U+2039
    'Ś', // 0x8C U+015A
    'Ť', // 0x8D U+0164
    'Ž', // 0x8E U+017D
    'Ź', // 0x8F U+0179

    '\u{0090}', // 0x90 U+0090
    '‘', // 0x91 U+2018
    '’', // 0x92 U+2019
    '“', // 0x93 U+201C
    '”', // 0x94 U+201D
    '•', // 0x95 U+2022
    '–', // 0x96 U+2013
    '—', // 0x97 U+2014
    '\u{0098}', // 0x98 U+0098
    '™', // 0x99 U+2122
    'š', // 0x9A U+0161
    '›', // 0x9B U+203A
    'ś', // 0x9C U+015B
    'ť', // 0x9D U+0165
    'ž', // 0x9E U+017E
    'ź', // 0x9F U+017A

    '\u{00A0}', // 0xA0 U+00A0
    'ˇ', // 0xA1 U+02C7
    '˘', // 0xA2 U+02D8
    'Ł', // 0xA3 U+0141
    '¤', // 0xA4 U+00A4
    'Ą', // 0xA5 U+0104
    '¦', // 0xA6 U+00A6
    '§', // 0xA7 U+00A7
    '¨', // 0xA8 U+00A8
    '©', // 0xA9 U+00A9
    'Ş', // 0xAA U+015E
    '«', // 0xAB U+00AB
    '¬', // 0xAC U+00AC
    '\u{00AD}', // 0xAD U+00AD
    '®', // 0xAE U+00AE
    'Ż', // 0xAF U+017B

    '°', // 0xB0 U+00B0
    '±', // 0xB1 U+00B1
    '˛', // 0xB2 U+02DB
    'ł', // 0xB3 U+0142
    '´', // 0xB4 U+00B4
    'µ', // 0xB5 U+00B5
    '¶', // 0xB6 U+00B6
    '·', // 0xB7 U+00B7
    '¸', // 0xB8 U+00B8
    'ą', // 0xB9 U+0105
    'ş', // 0xBA U+015F
    '»', // 0xBB U+00BB
    'Ľ', // 0xBC U+013D
    '˝', // 0xBD U+02DD
    'ľ', // 0xBE U+013E
    'ż', // 0xBF U+017C

    'Ŕ', // 0xC0 U+0154
    'Á', // 0xC1 U+00C1
    'Â', // 0xC2 U+00C2
    'Ă', // 0xC3 U+0102
    'Ä', // 0xC4 U+00C4
    'Ĺ', // 0xC5 U+0139
    'Ć', // 0xC6 U+0106
    'Ç', // 0xC7 U+00C7
    'Č', // 0xC8 U+010C
    'É', // 0xC9 U+00C9
    'Ę', // 0xCA U+0118
    'Ë', // 0xCB U+00CB
    'Ě', // 0xCC U+011A
    'Í', // 0xCD U+00CD
    'Î', // 0xCE U+00CE
    'Ď', // 0xCF U+010E

    'Đ', // 0xD0 U+0110
    'Ń', // 0xD1 U+0143
    'Ň', // 0xD2 U+0147
    'Ó', // 0xD3 U+00D3
    'Ô', // 0xD4 U+00D4
    'Ő', // 0xD5 U+0150
    'Ö', // 0xD6 U+00D6
    '×', // 0xD7 U+00D7
    'Ř', // 0xD8 U+0158
    'Ů', // 0xD9 U+016E
    'Ú', // 0xDA U+00DA
    'Ű', // 0xDB U+0170
    'Ü', // 0xDC U+00DC
    'Ý', // 0xDD U+00DD
    'Ţ', // 0xDE U+0162
    'ß', // 0xDF U+00DF

    'ŕ', // 0xE0 U+0155
    'á', // 0xE1 U+00E1
    'â', // 0xE2 U+00E2
    'ă', // 0xE3 U+0103
    'ä', // 0xE4 U+00E4
    'ĺ', // 0xE5 U+013A
    'ć', // 0xE6 U+0107
    'ç', // 0xE7 U+00E7
    'č', // 0xE8 U+010D
    'é', // 0xE9 U+00E9
    'ę', // 0xEA U+0119
    'ë', // 0xEB U+00EB
    'ě', // 0xEC U+011B
    'í', // 0xED U+00ED
    'î', // 0xEE U+00EE
    'ď', // 0xEF U+010F

    'đ', // 0xF0 U+0111
    'ń', // 0xF1 U+0144
    'ň', // 0xF2 U+0148
    'ó', // 0xF3 U+00F3
    'ô', // 0xF4 U+00F4
    'ő', // 0xF5 U+0151
    'ö', // 0xF6 U+00F6
    '÷', // 0xF7 U+00F7
    'ř', // 0xF8 U+0159
    'ů', // 0xF9 U+016F
    'ú', // 0xFA U+00FA
    'ű', // 0xFB U+0171
    'ü', // 0xFC U+00FC
    'ý', // 0xFD U+00FD
    'ţ', // 0xFE U+0163
    '˙', // 0xFF U+02D9
];
