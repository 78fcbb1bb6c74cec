// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Java properties files.
//!
//! ```text
//! properties        ISO-8859-1, everything above U+007E written as \uXXXX
//! properties-utf8   UTF-8, written verbatim
//! properties-utf16  UTF-16, written verbatim
//!
//! # comment              -> notes of the next entry
//! key = value \          -> continuation joins the next line
//!     continued
//! ```

use std::fmt::Write as _;

use super::store::{TranslationStore, TranslationUnit};
use super::{Capabilities, FileFormat};
use crate::error::FormatError;
use crate::utility::encoding::Encoding;

/// Java properties format in one of its encodings.
#[derive(Debug, Clone, Copy)]
pub struct PropertiesFormat {
    encoding: Encoding,
}

impl PropertiesFormat {
    #[must_use]
    pub const fn latin1() -> Self {
        Self {
            encoding: Encoding::Latin1,
        }
    }

    #[must_use]
    pub const fn utf8() -> Self {
        Self {
            encoding: Encoding::Utf8,
        }
    }

    #[must_use]
    pub const fn utf16() -> Self {
        Self {
            encoding: Encoding::Utf16,
        }
    }

    const fn escape_unicode(self) -> bool {
        matches!(self.encoding, Encoding::Latin1)
    }
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn read_hex4(path: &str, chars: &mut std::str::Chars<'_>) -> Result<u32, FormatError> {
    let hex: String = chars.by_ref().take(4).collect();
    u32::from_str_radix(&hex, 16)
        .map_err(|_| FormatError::parse(path, format!("invalid escape \\u{hex}")))
}

fn unescape(path: &str, text: &str) -> Result<String, FormatError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let code = read_hex4(path, &mut chars)?;
                if (0xD800..0xDC00).contains(&code) && chars.as_str().starts_with("\\u") {
                    chars.nth(1);
                    let low = read_hex4(path, &mut chars)?;
                    let pair = [u16::try_from(code).unwrap_or(0), u16::try_from(low).unwrap_or(0)];
                    out.push_str(&String::from_utf16_lossy(&pair));
                } else {
                    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..index], line[index + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[index..].trim_start();
                let rest = rest
                    .strip_prefix(['=', ':'])
                    .map_or(rest, str::trim_start);
                return (&line[..index], rest);
            }
            _ => {}
        }
    }
    (line, "")
}

fn escape_text(text: &str, is_key: bool, escape_unicode: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || index == 0 => out.push_str("\\ "),
            c if escape_unicode && u32::from(c) > 0x7e => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
            c => out.push(c),
        }
    }
    out
}

impl FileFormat for PropertiesFormat {
    fn id(&self) -> &'static str {
        match self.encoding {
            Encoding::Latin1 => "properties",
            Encoding::Utf8 => "properties-utf8",
            Encoding::Utf16 => "properties-utf16",
        }
    }

    fn name(&self) -> &'static str {
        match self.encoding {
            Encoding::Latin1 => "Java Properties (ISO-8859-1)",
            Encoding::Utf8 => "Java Properties (UTF-8)",
            Encoding::Utf16 => "Java Properties (UTF-16)",
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NEW_TRANSLATION | Capabilities::ADD_UNIT
    }

    fn monolingual(&self) -> bool {
        true
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn autoload(&self) -> &'static [&'static str] {
        match self.encoding {
            Encoding::Latin1 => &["**/*.properties"],
            Encoding::Utf8 | Encoding::Utf16 => &[],
        }
    }

    fn check_flags(&self) -> &'static [&'static str] {
        &["auto-java-messageformat"]
    }

    fn parse(&self, path: &str, content: &str) -> Result<TranslationStore, FormatError> {
        let mut store = TranslationStore::default();
        let mut notes: Vec<String> = Vec::new();
        let mut lines = content.lines();

        while let Some(raw) = lines.next() {
            let line = raw.trim_start();
            if line.is_empty() {
                if store.units.is_empty() && !notes.is_empty() {
                    store.header_notes.append(&mut notes);
                }
                continue;
            }
            if line.starts_with('#') || line.starts_with('!') {
                notes.push(raw.to_string());
                continue;
            }
            let mut logical = line.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some(next) => logical.push_str(next.trim_start()),
                    None => break,
                }
            }
            let (key, value) = split_key_value(&logical);
            let mut unit = TranslationUnit::keyed(unescape(path, key)?, unescape(path, value)?);
            unit.notes = std::mem::take(&mut notes);
            store.units.push(unit);
        }
        store.trailer = notes;
        Ok(store)
    }

    fn serialize(&self, store: &TranslationStore) -> Result<String, FormatError> {
        let mut out = String::new();
        for note in &store.header_notes {
            let _ = writeln!(out, "{note}");
        }
        if !store.header_notes.is_empty() {
            out.push('\n');
        }
        for unit in &store.units {
            for note in &unit.notes {
                let _ = writeln!(out, "{note}");
            }
            let _ = writeln!(
                out,
                "{}={}",
                escape_text(&unit.context, true, self.escape_unicode()),
                escape_text(&unit.target, false, self.escape_unicode())
            );
        }
        for note in &store.trailer {
            let _ = writeln!(out, "{note}");
        }
        Ok(out)
    }

    fn empty_store(&self) -> Option<TranslationStore> {
        Some(TranslationStore::default())
    }
}
