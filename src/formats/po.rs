// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! GNU gettext PO files, bilingual and monolingual.
//!
//! ```text
//! # translator comment          -> notes
//! #. extracted comment          -> explanation
//! #: src/main.c:10              -> notes
//! #, fuzzy, c-format            -> fuzzy + flags
//! msgctxt "menu"                -> context (bilingual)
//! msgid "File"                  -> source   (monolingual: also the key)
//! msgid_plural "Files"          -> source form 2
//! msgstr[0] "Datei"             -> target forms
//! #~ msgid "old"                -> trailer, written back unchanged
//! ```
//!
//! The entry with an empty msgid and no context is the header.

use std::fmt::Write as _;

use super::store::{PLURAL_SEPARATOR, TranslationStore, TranslationUnit};
use super::{Capabilities, FileFormat, HeaderUpdate};
use crate::error::FormatError;

/// Gettext PO format.
#[derive(Debug, Clone, Copy)]
pub struct PoFormat {
    monolingual: bool,
}

impl PoFormat {
    #[must_use]
    pub const fn bilingual() -> Self {
        Self { monolingual: false }
    }

    #[must_use]
    pub const fn monolingual() -> Self {
        Self { monolingual: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Context,
    Id,
    IdPlural,
    Str(usize),
}

#[derive(Debug, Default)]
struct Entry {
    notes: Vec<String>,
    explanation: Vec<String>,
    flags: Vec<String>,
    fuzzy: bool,
    context: Option<String>,
    id: Option<String>,
    id_plural: Option<String>,
    strs: Vec<String>,
}

impl Entry {
    fn is_empty(&self) -> bool {
        self.id.is_none() && self.context.is_none() && self.notes.is_empty()
            && self.explanation.is_empty() && self.flags.is_empty()
    }

    fn append(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::None => return,
            Field::Context => self.context.get_or_insert_default(),
            Field::Id => self.id.get_or_insert_default(),
            Field::IdPlural => self.id_plural.get_or_insert_default(),
            Field::Str(index) => {
                if self.strs.len() <= index {
                    self.strs.resize(index + 1, String::new());
                }
                &mut self.strs[index]
            }
        };
        slot.push_str(text);
    }
}

fn parse_error(path: &str, line: usize, message: &str) -> FormatError {
    FormatError::parse(path, format!("line {line}: {message}"))
}

/// Unescapes a quoted PO string, including the quotes.
fn unquote(path: &str, line: usize, raw: &str) -> Result<String, FormatError> {
    let inner = raw
        .trim()
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| parse_error(path, line, "expected a quoted string"))?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => return Err(parse_error(path, line, "dangling escape")),
        }
    }
    Ok(out)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn write_field(out: &mut String, keyword: &str, text: &str) {
    let trimmed = text.strip_suffix('\n').unwrap_or(text);
    if trimmed.contains('\n') {
        let _ = writeln!(out, "{keyword} \"\"");
        for line in text.split_inclusive('\n') {
            let _ = writeln!(out, "\"{}\"", escape(line));
        }
    } else {
        let _ = writeln!(out, "{keyword} \"{}\"", escape(text));
    }
}

fn parse_header(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

impl PoFormat {
    fn finish(&self, entry: Entry, store: &mut TranslationStore, seen_header: &mut bool) {
        let Some(id) = entry.id else {
            return;
        };
        if id.is_empty() && entry.context.is_none() && !*seen_header {
            *seen_header = true;
            store.header = parse_header(entry.strs.first().map_or("", String::as_str));
            store.header_notes.extend(entry.notes);
            return;
        }
        let mut source = id.clone();
        if let Some(plural) = &entry.id_plural {
            source.push_str(PLURAL_SEPARATOR);
            source.push_str(plural);
        }
        let target = if entry.id_plural.is_some() {
            entry.strs.join(PLURAL_SEPARATOR)
        } else {
            entry.strs.into_iter().next().unwrap_or_default()
        };
        let context = if self.monolingual {
            id
        } else {
            entry.context.unwrap_or_default()
        };
        store.units.push(TranslationUnit {
            context,
            source,
            target,
            explanation: entry.explanation.join("\n"),
            notes: entry.notes,
            flags: entry.flags,
            fuzzy: entry.fuzzy,
            read_only: false,
            quantities: Vec::new(),
        });
    }

    fn write_unit(&self, out: &mut String, unit: &TranslationUnit) {
        for note in unit
            .notes
            .iter()
            .filter(|n| !n.starts_with("#:") && !n.starts_with("#|"))
        {
            let _ = writeln!(out, "{note}");
        }
        for line in unit.explanation.lines() {
            let _ = writeln!(out, "#. {line}");
        }
        for note in unit.notes.iter().filter(|n| n.starts_with("#:")) {
            let _ = writeln!(out, "{note}");
        }
        let mut flags: Vec<&str> = Vec::new();
        if unit.fuzzy {
            flags.push("fuzzy");
        }
        flags.extend(unit.flags.iter().map(String::as_str));
        if !flags.is_empty() {
            let _ = writeln!(out, "#, {}", flags.join(", "));
        }
        for note in unit.notes.iter().filter(|n| n.starts_with("#|")) {
            let _ = writeln!(out, "{note}");
        }

        if !self.monolingual && !unit.context.is_empty() {
            write_field(out, "msgctxt", &unit.context);
        }
        let source = if unit.source.is_empty() {
            unit.context.as_str()
        } else {
            unit.source.as_str()
        };
        let mut sources = source.split(PLURAL_SEPARATOR);
        write_field(out, "msgid", sources.next().unwrap_or_default());
        match sources.next() {
            Some(plural) => {
                write_field(out, "msgid_plural", plural);
                for (index, form) in unit.target.split(PLURAL_SEPARATOR).enumerate() {
                    write_field(out, &format!("msgstr[{index}]"), form);
                }
            }
            None => write_field(out, "msgstr", &unit.target),
        }
    }
}

impl FileFormat for PoFormat {
    fn id(&self) -> &'static str {
        if self.monolingual { "po-mono" } else { "po" }
    }

    fn name(&self) -> &'static str {
        if self.monolingual {
            "gettext PO file (monolingual)"
        } else {
            "gettext PO file"
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn monolingual(&self) -> bool {
        self.monolingual
    }

    fn autoload(&self) -> &'static [&'static str] {
        if self.monolingual {
            &[]
        } else {
            &["**/*.po", "**/*.pot"]
        }
    }

    fn parse(&self, path: &str, content: &str) -> Result<TranslationStore, FormatError> {
        let mut store = TranslationStore::default();
        let mut entry = Entry::default();
        let mut field = Field::None;
        let mut seen_header = false;

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end();

            if line.starts_with("#~") {
                store.trailer.push(line.to_string());
                continue;
            }
            let starts_entry = line.is_empty()
                || (line.starts_with('#') && field != Field::None && entry.id.is_some())
                || (line.starts_with("msgctxt") && entry.id.is_some())
                || (line.starts_with("msgid ") && entry.id.is_some());
            if starts_entry {
                self.finish(std::mem::take(&mut entry), &mut store, &mut seen_header);
                field = Field::None;
                if line.is_empty() {
                    continue;
                }
            }

            if let Some(rest) = line.strip_prefix("#.") {
                entry.explanation.push(rest.trim_start().to_string());
            } else if let Some(rest) = line.strip_prefix("#,") {
                for flag in rest.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                    if flag == "fuzzy" {
                        entry.fuzzy = true;
                    } else {
                        entry.flags.push(flag.to_string());
                    }
                }
            } else if line.starts_with('#') {
                entry.notes.push(line.to_string());
            } else if line.starts_with('"') {
                if field == Field::None {
                    return Err(parse_error(path, line_no, "string without keyword"));
                }
                entry.append(field, &unquote(path, line_no, line)?);
            } else {
                let (keyword, rest) = line
                    .split_once([' ', '\t'])
                    .ok_or_else(|| parse_error(path, line_no, "expected keyword and string"))?;
                field = match keyword {
                    "msgctxt" => Field::Context,
                    "msgid" => Field::Id,
                    "msgid_plural" => Field::IdPlural,
                    "msgstr" => Field::Str(0),
                    other => {
                        let index = other
                            .strip_prefix("msgstr[")
                            .and_then(|s| s.strip_suffix(']'))
                            .and_then(|s| s.parse::<usize>().ok())
                            .ok_or_else(|| {
                                parse_error(path, line_no, &format!("unknown keyword {other}"))
                            })?;
                        Field::Str(index)
                    }
                };
                let text = unquote(path, line_no, rest)?;
                entry.append(field, &text);
            }
        }
        if !entry.is_empty() {
            self.finish(entry, &mut store, &mut seen_header);
        }
        Ok(store)
    }

    fn serialize(&self, store: &TranslationStore) -> Result<String, FormatError> {
        let mut out = String::new();
        for note in &store.header_notes {
            let _ = writeln!(out, "{note}");
        }
        if !store.header.is_empty() {
            out.push_str("msgid \"\"\nmsgstr \"\"\n");
            for (key, value) in &store.header {
                let _ = writeln!(out, "\"{}\"", escape(&format!("{key}: {value}\n")));
            }
        }
        for unit in &store.units {
            if !out.is_empty() {
                out.push('\n');
            }
            self.write_unit(&mut out, unit);
        }
        if !store.trailer.is_empty() {
            out.push('\n');
            for line in &store.trailer {
                let _ = writeln!(out, "{line}");
            }
        }
        Ok(out)
    }

    fn update_header(&self, store: &mut TranslationStore, update: &HeaderUpdate) {
        if store.header.is_empty() {
            let project = if update.project.is_empty() {
                "PACKAGE VERSION"
            } else {
                update.project.as_str()
            };
            store.set_header("Project-Id-Version", project);
            store.set_header("MIME-Version", "1.0");
            store.set_header("Content-Type", "text/plain; charset=UTF-8");
            store.set_header("Content-Transfer-Encoding", "8bit");
        }
        if let Some(date) = update.revision_date {
            store.set_header("PO-Revision-Date", date.format("%Y-%m-%d %H:%M%z").to_string());
        }
        if let Some(translator) = &update.last_translator {
            store.set_header("Last-Translator", translator.clone());
        }
        if !update.language.is_empty() {
            store.set_header("Language-Team", update.language_name.clone());
            store.set_header("Language", self.language_code(&update.language));
        }
        if !update.plural_forms.is_empty() {
            store.set_header("Plural-Forms", update.plural_forms.clone());
        }
        store.set_header("X-Generator", format!("Transync {}", env!("CARGO_PKG_VERSION")));
    }
}
