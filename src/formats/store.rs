// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory form of a parsed translation file.

use crate::models::{UnitState, id_hash};

/// Separates plural forms inside `source` and `target`.
pub const PLURAL_SEPARATOR: &str = "\u{1e}\u{1e}";

/// One translatable entry of a file.
///
/// Monolingual formats keep the key in `context`; their source text comes
/// from the template, whatever `source` the file itself carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Disambiguating context, or the key of a monolingual unit.
    pub context: String,
    /// Source text, plural forms joined by [`PLURAL_SEPARATOR`].
    pub source: String,
    /// Translated text, plural forms joined by [`PLURAL_SEPARATOR`].
    pub target: String,
    /// Note for translators written by developers.
    pub explanation: String,
    /// Other comment lines, kept verbatim for writing back.
    pub notes: Vec<String>,
    /// Format flags such as `c-format`; `fuzzy` is tracked separately.
    pub flags: Vec<String>,
    pub fuzzy: bool,
    pub read_only: bool,
    /// Plural quantity names (`one`, `other`, ...) where the format names them.
    pub quantities: Vec<String>,
}

impl TranslationUnit {
    /// Monolingual unit with a key and value.
    #[must_use]
    pub fn keyed(key: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            context: key.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Bilingual unit with a source and translation.
    #[must_use]
    pub fn bilingual(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub fn is_plural(&self) -> bool {
        self.source.contains(PLURAL_SEPARATOR) || self.target.contains(PLURAL_SEPARATOR)
    }

    /// Plural forms of the target.
    #[must_use]
    pub fn target_forms(&self) -> Vec<&str> {
        self.target.split(PLURAL_SEPARATOR).collect()
    }

    #[must_use]
    pub fn state(&self) -> UnitState {
        if self.read_only {
            UnitState::ReadOnly
        } else if self.target.split(PLURAL_SEPARATOR).all(str::is_empty) {
            UnitState::Empty
        } else {
            UnitState::from_file(&self.target, self.fuzzy)
        }
    }

    /// Content hash: key for monolingual files, source and context otherwise.
    #[must_use]
    pub fn id_hash(&self, monolingual: bool) -> i64 {
        if monolingual {
            id_hash("", &self.context)
        } else {
            id_hash(&self.source, &self.context)
        }
    }

    /// Sets target and fuzzy marker from a unit state.
    pub fn set_target(&mut self, target: &str, state: UnitState) {
        self.target = target.to_string();
        self.fuzzy = state == UnitState::NeedsEditing;
    }
}

/// A parsed file: ordered header fields plus units in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStore {
    /// Header fields (`Language`, `Plural-Forms`, ...) for formats with a header.
    pub header: Vec<(String, String)>,
    /// Comment lines above the header or at the top of the file.
    pub header_notes: Vec<String>,
    pub units: Vec<TranslationUnit>,
    /// Lines written after the units unchanged (obsolete gettext entries).
    pub trailer: Vec<String>,
}

impl TranslationStore {
    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.header
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Replaces or appends a header field.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .header
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.header.push((name.to_string(), value)),
        }
    }

    /// Finds a unit by context and source.
    ///
    /// An empty `source` matches by context only, the lookup used for
    /// monolingual keys.
    #[must_use]
    pub fn find_unit(&self, context: &str, source: &str) -> Option<usize> {
        self.units.iter().position(|unit| {
            unit.context == context && (source.is_empty() || unit.source == source)
        })
    }

    /// Appends a unit, or replaces the one with the same context and source.
    pub fn add_unit(&mut self, unit: TranslationUnit) -> usize {
        match self.find_unit(&unit.context, &unit.source) {
            Some(index) => {
                self.units[index] = unit;
                index
            }
            None => {
                self.units.push(unit);
                self.units.len() - 1
            }
        }
    }

    /// Clears every translation, the seed of a new language file.
    ///
    /// Plural units get `plural_count` empty forms and obsolete gettext
    /// entries are dropped.
    pub fn untranslate(&mut self, plural_count: usize) {
        let plural_count = plural_count.max(1);
        for unit in &mut self.units {
            if unit.read_only {
                continue;
            }
            if unit.is_plural() || !unit.quantities.is_empty() {
                unit.target = vec![""; plural_count].join(PLURAL_SEPARATOR);
                if !unit.quantities.is_empty() {
                    unit.quantities = plural_quantities(plural_count)
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                }
            } else {
                unit.target.clear();
            }
            unit.fuzzy = false;
        }
        self.trailer.retain(|line| !line.starts_with("#~"));
    }
}

/// CLDR quantity names for a number of plural forms.
#[must_use]
pub fn plural_quantities(count: usize) -> &'static [&'static str] {
    match count {
        1 => &["other"],
        2 => &["one", "other"],
        3 => &["one", "few", "other"],
        4 => &["one", "few", "many", "other"],
        5 => &["one", "two", "few", "many", "other"],
        _ => &["zero", "one", "two", "few", "many", "other"],
    }
}
