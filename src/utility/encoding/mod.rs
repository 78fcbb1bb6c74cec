// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Text encodings of translation files.
//!
//! ```text
//! File bytes                     Internal     File bytes
//! UTF-8 (BOM stripped)  --+                +--> UTF-8
//! UTF-16 (BOM sniffed)  --+-(decode)-> str +--> UTF-16LE + BOM
//! ISO-8859-1            --+                +--> ISO-8859-1 (caller escapes > U+00FF)
//! ```
//!
//! Uses `encoding_rs`. Invalid sequences → U+FFFD.

use encoding_rs::{UTF_8, UTF_16BE, UTF_16LE};
use std::borrow::Cow;

/// Encoding of a translation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// UTF-16, little endian unless a big-endian BOM is present
    Utf16,
    /// ISO-8859-1, one byte per code point
    Latin1,
}

/// Decodes file content to UTF-8.
///
/// # Example
/// ```
/// use transync::utility::encoding::{decode, Encoding};
///
/// assert_eq!(decode(Encoding::Latin1, b"caf\xe9"), "café");
/// assert_eq!(decode(Encoding::Utf8, b"\xef\xbb\xbfkey=value"), "key=value");
/// ```
#[must_use]
pub fn decode(encoding: Encoding, bytes: &[u8]) -> Cow<'_, str> {
    match encoding {
        Encoding::Utf8 => UTF_8.decode_with_bom_removal(bytes).0,
        Encoding::Utf16 => {
            let codec = match bytes {
                [0xFE, 0xFF, ..] => UTF_16BE,
                _ => UTF_16LE,
            };
            codec.decode_with_bom_removal(bytes).0
        }
        Encoding::Latin1 => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Encodes UTF-8 text for writing.
///
/// UTF-16 output is little endian with a BOM. Latin-1 output replaces code
/// points above U+00FF with `?`; formats needing them escape beforehand.
#[must_use]
pub fn encode(encoding: Encoding, text: &str) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Utf16 => {
            let mut out = Vec::with_capacity(2 + text.len() * 2);
            out.extend_from_slice(&[0xFF, 0xFE]);
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out
        }
        Encoding::Latin1 => text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect(),
    }
}

#[cfg(test)]
mod tests;
