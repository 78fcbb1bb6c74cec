// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Android string resources.
//!
//! ```text
//! <resources>
//!   <!-- note -->                         -> notes of the next unit
//!   <string name="app">Demo</string>       -> key "app"
//!   <string name="id" translatable="false"> read-only unit
//!   <plurals name="files">                 -> one unit, forms joined by
//!     <item quantity="one">%d file</item>     PLURAL_SEPARATOR, quantity
//!     <item quantity="other">%d files</item>  names kept on the unit
//!   </plurals>
//! </resources>
//! ```
//!
//! Inline markup (`<b>`, `<xliff:g>`) inside a string is kept as raw text.

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::store::{PLURAL_SEPARATOR, TranslationStore, TranslationUnit, plural_quantities};
use super::{Capabilities, CodeStyle, FileFormat};
use crate::error::FormatError;

/// Android `strings.xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidFormat;

fn attribute(path: &str, element: &BytesStart<'_>, name: &str) -> Result<Option<String>, FormatError> {
    let Some(attr) = element
        .try_get_attribute(name)
        .map_err(|e| FormatError::parse(path, e))?
    else {
        return Ok(None);
    };
    let value = attr.unescape_value().map_err(|e| FormatError::parse(path, e))?;
    Ok(Some(value.into_owned()))
}

/// Resolves Android backslash escapes and surrounding quotes.
fn unescape_android(raw: &str) -> String {
    let text = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn escape_android(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for (index, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '&' => out.push_str("&amp;"),
            '@' | '?' if index == 0 => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    escape_lt(&out)
}

/// Escapes `<` unless it opens inline markup.
fn escape_lt(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find('<') {
        out.push_str(&rest[..index]);
        let after = &rest[index + 1..];
        let markup = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/')
            && after.contains('>');
        out.push_str(if markup { "<" } else { "&lt;" });
        rest = after;
    }
    out.push_str(rest);
    out
}

#[derive(Default)]
struct Plurals {
    unit: TranslationUnit,
    forms: Vec<String>,
    item: Option<(String, String)>,
}

enum Open {
    None,
    String(TranslationUnit, String),
    Plurals(Plurals),
}

impl Open {
    /// Buffer receiving text at the current position, if any.
    fn buffer(&mut self) -> Option<&mut String> {
        match self {
            Self::None => None,
            Self::String(_, buf) => Some(buf),
            Self::Plurals(plurals) => plurals.item.as_mut().map(|(_, buf)| buf),
        }
    }
}

fn raw_tag(element: &BytesStart<'_>, empty: bool) -> String {
    let inner = String::from_utf8_lossy(element);
    if empty {
        format!("<{inner}/>")
    } else {
        format!("<{inner}>")
    }
}

impl FileFormat for AndroidFormat {
    fn id(&self) -> &'static str {
        "aresource"
    }

    fn name(&self) -> &'static str {
        "Android String Resource"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NEW_TRANSLATION | Capabilities::ADD_UNIT | Capabilities::PLURALS
    }

    fn monolingual(&self) -> bool {
        true
    }

    fn autoload(&self) -> &'static [&'static str] {
        &["**/strings*.xml", "**/values*/*.xml"]
    }

    fn code_style(&self) -> CodeStyle {
        CodeStyle::Android
    }

    fn check_flags(&self) -> &'static [&'static str] {
        &["java-printf-format"]
    }

    fn parse(&self, path: &str, content: &str) -> Result<TranslationStore, FormatError> {
        let mut store = TranslationStore::default();
        if content.trim().is_empty() {
            return Ok(store);
        }
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);

        let mut open = Open::None;
        let mut notes: Vec<String> = Vec::new();
        // Depth of inline markup inside the open string or item.
        let mut markup = 0usize;

        loop {
            match reader.read_event().map_err(|e| FormatError::parse(path, e))? {
                Event::Start(element) => {
                    let idle = matches!(open, Open::None);
                    match element.name().as_ref() {
                        b"string" if idle => {
                            let key = attribute(path, &element, "name")?
                                .ok_or_else(|| FormatError::parse(path, "<string> without name"))?;
                            let mut unit = TranslationUnit::keyed(key, "");
                            unit.read_only =
                                attribute(path, &element, "translatable")?.as_deref() == Some("false");
                            unit.notes = std::mem::take(&mut notes);
                            open = Open::String(unit, String::new());
                        }
                        b"plurals" if idle => {
                            let key = attribute(path, &element, "name")?
                                .ok_or_else(|| FormatError::parse(path, "<plurals> without name"))?;
                            let mut unit = TranslationUnit::keyed(key, "");
                            unit.notes = std::mem::take(&mut notes);
                            open = Open::Plurals(Plurals {
                                unit,
                                ..Plurals::default()
                            });
                        }
                        b"item" if matches!(&open, Open::Plurals(p) if p.item.is_none()) => {
                            let quantity =
                                attribute(path, &element, "quantity")?.unwrap_or_else(|| "other".to_string());
                            if let Open::Plurals(plurals) = &mut open {
                                plurals.item = Some((quantity, String::new()));
                            }
                        }
                        _ => {
                            if let Some(buf) = open.buffer() {
                                buf.push_str(&raw_tag(&element, false));
                                markup += 1;
                            }
                        }
                    }
                }
                Event::Empty(element) => {
                    if let Some(buf) = open.buffer() {
                        buf.push_str(&raw_tag(&element, true));
                    } else if matches!(open, Open::None) && element.name().as_ref() == b"string" {
                        let key = attribute(path, &element, "name")?
                            .ok_or_else(|| FormatError::parse(path, "<string> without name"))?;
                        let mut unit = TranslationUnit::keyed(key, "");
                        unit.notes = std::mem::take(&mut notes);
                        store.units.push(unit);
                    }
                }
                Event::End(element) => {
                    if markup > 0 {
                        markup -= 1;
                        if let Some(buf) = open.buffer() {
                            buf.push_str("</");
                            buf.push_str(&String::from_utf8_lossy(element.name().as_ref()));
                            buf.push('>');
                        }
                        continue;
                    }
                    match (std::mem::replace(&mut open, Open::None), element.name().as_ref()) {
                        (Open::String(mut unit, buf), b"string") => {
                            unit.target = unescape_android(&buf);
                            store.units.push(unit);
                        }
                        (Open::Plurals(mut plurals), b"item") => {
                            if let Some((quantity, buf)) = plurals.item.take() {
                                plurals.unit.quantities.push(quantity);
                                plurals.forms.push(unescape_android(&buf));
                            }
                            open = Open::Plurals(plurals);
                        }
                        (Open::Plurals(mut plurals), b"plurals") => {
                            plurals.unit.target = plurals.forms.join(PLURAL_SEPARATOR);
                            store.units.push(plurals.unit);
                        }
                        (other, _) => open = other,
                    }
                }
                Event::Text(text) => {
                    if let Some(buf) = open.buffer() {
                        let decoded = text.unescape().map_err(|e| FormatError::parse(path, e))?;
                        buf.push_str(&decoded);
                    }
                }
                Event::CData(data) => {
                    if let Some(buf) = open.buffer() {
                        buf.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Comment(comment) => {
                    if matches!(open, Open::None) {
                        notes.push(String::from_utf8_lossy(&comment).trim().to_string());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !matches!(open, Open::None) {
            return Err(FormatError::parse(path, "unexpected end of file"));
        }
        store.trailer = notes;
        Ok(store)
    }

    fn serialize(&self, store: &TranslationStore) -> Result<String, FormatError> {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n");
        for unit in &store.units {
            for note in &unit.notes {
                let _ = writeln!(out, "    <!-- {note} -->");
            }
            let name = escape_attr(&unit.context);
            if unit.is_plural() || !unit.quantities.is_empty() {
                let forms = unit.target_forms();
                let fallback = plural_quantities(forms.len());
                let _ = writeln!(out, "    <plurals name=\"{name}\">");
                for (index, form) in forms.iter().enumerate() {
                    let quantity = unit
                        .quantities
                        .get(index)
                        .map(String::as_str)
                        .or_else(|| fallback.get(index).copied())
                        .unwrap_or("other");
                    let _ = writeln!(
                        out,
                        "        <item quantity=\"{quantity}\">{}</item>",
                        escape_android(form)
                    );
                }
                out.push_str("    </plurals>\n");
            } else {
                let translatable = if unit.read_only {
                    " translatable=\"false\""
                } else {
                    ""
                };
                let _ = writeln!(
                    out,
                    "    <string name=\"{name}\"{translatable}>{}</string>",
                    escape_android(&unit.target)
                );
            }
        }
        for note in &store.trailer {
            let _ = writeln!(out, "    <!-- {note} -->");
        }
        out.push_str("</resources>\n");
        Ok(out)
    }

    fn empty_store(&self) -> Option<TranslationStore> {
        Some(TranslationStore::default())
    }
}

fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
