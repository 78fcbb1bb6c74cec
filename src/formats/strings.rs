// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! OS X / iOS `.strings` files.
//!
//! ```text
//! /* Title of the main window */     -> explanation of the next entry
//! "window.title" = "Fenster";
//! ```

use std::fmt::Write as _;
use std::iter::Peekable;
use std::str::Chars;

use super::store::{TranslationStore, TranslationUnit};
use super::{Capabilities, CodeStyle, FileFormat};
use crate::error::FormatError;

/// Apple strings file in UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringsFormat;

struct Lexer<'a> {
    path: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(path: &'a str, content: &'a str) -> Self {
        Self {
            path,
            chars: content.trim_start_matches('\u{feff}').chars().peekable(),
        }
    }

    fn error(&self, message: &str) -> FormatError {
        FormatError::parse(self.path, message)
    }

    /// Skips whitespace and returns the comments passed over.
    fn skip_trivia(&mut self) -> Result<Vec<String>, FormatError> {
        let mut comments = Vec::new();
        loop {
            while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
            if self.chars.peek() != Some(&'/') {
                return Ok(comments);
            }
            self.chars.next();
            match self.chars.next() {
                Some('*') => {
                    let mut text = String::new();
                    loop {
                        match self.chars.next() {
                            Some('*') if self.chars.peek() == Some(&'/') => {
                                self.chars.next();
                                break;
                            }
                            Some(c) => text.push(c),
                            None => return Err(self.error("unterminated comment")),
                        }
                    }
                    comments.push(text.trim().to_string());
                }
                Some('/') => {
                    let text: String = self.chars.by_ref().take_while(|&c| c != '\n').collect();
                    comments.push(text.trim().to_string());
                }
                _ => return Err(self.error("unexpected '/'")),
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), FormatError> {
        self.skip_trivia()?;
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            _ => Err(self.error(&format!("expected '{expected}'"))),
        }
    }

    fn string(&mut self) -> Result<String, FormatError> {
        self.skip_trivia()?;
        if self.chars.next() != Some('"') {
            return Err(self.error("expected a quoted string"));
        }
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some('"') => return Ok(out),
                Some('\\') => match self.chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('U' | 'u') => {
                        let hex: String = self.chars.by_ref().take(4).collect();
                        let code = u32::from_str_radix(&hex, 16)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or_else(|| self.error("invalid unicode escape"))?;
                        out.push(code);
                    }
                    Some(c) => out.push(c),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl FileFormat for StringsFormat {
    fn id(&self) -> &'static str {
        "strings"
    }

    fn name(&self) -> &'static str {
        "iOS strings (UTF-8)"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NEW_TRANSLATION | Capabilities::ADD_UNIT
    }

    fn monolingual(&self) -> bool {
        true
    }

    fn autoload(&self) -> &'static [&'static str] {
        &["**/*.strings"]
    }

    fn code_style(&self) -> CodeStyle {
        CodeStyle::Bcp
    }

    fn check_flags(&self) -> &'static [&'static str] {
        &["c-format"]
    }

    fn parse(&self, path: &str, content: &str) -> Result<TranslationStore, FormatError> {
        let mut store = TranslationStore::default();
        let mut lexer = Lexer::new(path, content);
        loop {
            let mut comments = lexer.skip_trivia()?;
            if lexer.chars.peek().is_none() {
                store.trailer = comments;
                return Ok(store);
            }
            let key = lexer.string()?;
            lexer.expect('=')?;
            let value = lexer.string()?;
            lexer.expect(';')?;
            let mut unit = TranslationUnit::keyed(key, value);
            if let Some(last) = comments.pop() {
                unit.explanation = last;
            }
            unit.notes = comments;
            store.units.push(unit);
        }
    }

    fn serialize(&self, store: &TranslationStore) -> Result<String, FormatError> {
        let mut out = String::new();
        for unit in &store.units {
            for note in &unit.notes {
                let _ = writeln!(out, "/* {note} */");
            }
            if !unit.explanation.is_empty() {
                let _ = writeln!(out, "/* {} */", unit.explanation);
            }
            let _ = writeln!(out, "{} = {};", quote(&unit.context), quote(&unit.target));
            out.push('\n');
        }
        for note in &store.trailer {
            let _ = writeln!(out, "/* {note} */");
        }
        Ok(out)
    }

    fn empty_store(&self) -> Option<TranslationStore> {
        Some(TranslationStore::default())
    }
}
