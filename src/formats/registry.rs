// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Format registry: id lookup and detection from file names.
//!
//! ```text
//! registry() --> built once, read-only afterwards
//!   get("po")            --> Arc<PoFormat>
//!   detect("de/app.po")  --> first format whose autoload glob matches,
//!                            specific patterns before generic ones
//! ```

use std::sync::{Arc, LazyLock};

use wax::{Glob, Program};

use super::FileFormat;
use super::aresource::AndroidFormat;
use super::csvfile::CsvFormat;
use super::json::JsonFormat;
use super::po::PoFormat;
use super::properties::PropertiesFormat;
use super::strings::StringsFormat;
use crate::error::FormatError;

static REGISTRY: LazyLock<FormatRegistry> = LazyLock::new(FormatRegistry::builtin);

/// The shared registry of built-in formats.
#[must_use]
pub fn registry() -> &'static FormatRegistry {
    &REGISTRY
}

/// Ordered collection of format adapters.
#[derive(Debug, Default)]
pub struct FormatRegistry {
    formats: Vec<Arc<dyn FileFormat>>,
}

impl FormatRegistry {
    /// Registry with every built-in format, in detection order.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(JsonFormat::webextension());
        registry.register(AndroidFormat);
        registry.register(PoFormat::bilingual());
        registry.register(PoFormat::monolingual());
        registry.register(PropertiesFormat::latin1());
        registry.register(PropertiesFormat::utf8());
        registry.register(PropertiesFormat::utf16());
        registry.register(StringsFormat);
        registry.register(CsvFormat);
        registry.register(JsonFormat::flat());
        registry.register(JsonFormat::nested());
        registry
    }

    /// Adds a format; a later format with the same id replaces the earlier one.
    pub fn register(&mut self, format: impl FileFormat + 'static) {
        let format: Arc<dyn FileFormat> = Arc::new(format);
        match self.formats.iter_mut().find(|f| f.id() == format.id()) {
            Some(slot) => *slot = format,
            None => self.formats.push(format),
        }
    }

    /// Looks up a format by id.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::UnknownFormat` for an unregistered id.
    pub fn get(&self, id: &str) -> Result<Arc<dyn FileFormat>, FormatError> {
        self.formats
            .iter()
            .find(|format| format.id() == id)
            .cloned()
            .ok_or_else(|| FormatError::UnknownFormat(id.to_string()))
    }

    /// Guesses the format of a file from its path.
    #[must_use]
    pub fn detect(&self, filename: &str) -> Option<Arc<dyn FileFormat>> {
        let filename = filename.replace('\\', "/");
        self.formats
            .iter()
            .find(|format| {
                format.autoload().iter().any(|pattern| {
                    Glob::new(pattern).is_ok_and(|glob| glob.is_match(filename.as_str()))
                })
            })
            .cloned()
    }

    /// Registered ids in detection order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.iter().map(|format| format.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn FileFormat>> {
        self.formats.iter()
    }
}
