// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Translation file formats.
//!
//! ```text
//!                 FormatRegistry (id -> Arc<dyn FileFormat>)
//!                            |
//!   bytes --decode(encoding)--> parse() --> TranslationStore --> serialize()
//!         <--encode(encoding)--------------------------------------+
//!                                                                  |
//!   load()  : read + content revision + parse                  write_atomic
//!   save()  : serialize + encode ------------------------------------+
//!
//! Capabilities replace probing: NEW_TRANSLATION, ADD_UNIT, HEADER,
//! PLURALS, FUZZY.
//! ```

pub mod aresource;
pub mod csvfile;
pub mod json;
pub mod language;
pub mod po;
pub mod properties;
pub mod registry;
pub mod store;
pub mod strings;

#[cfg(test)]
mod tests;

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;

pub use registry::{FormatRegistry, registry};
pub use store::{PLURAL_SEPARATOR, TranslationStore, TranslationUnit};

use crate::error::{FormatError, FsError, SyncResult};
use crate::models::content_revision;
use crate::utility::encoding::{Encoding, decode, encode};
use crate::utility::fs::write_atomic;

bitflags! {
    /// What a format can do beyond parsing and writing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        /// New language files can be created
        const NEW_TRANSLATION = 0x01;
        /// Units can be appended
        const ADD_UNIT = 0x02;
        /// The file carries a metadata header
        const HEADER = 0x04;
        /// Plural forms are stored
        const PLURALS = 0x08;
        /// Needs-editing state survives a round trip
        const FUZZY = 0x10;
    }
}

/// How a format spells language codes in file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStyle {
    /// `pt_BR`
    Posix,
    /// `pt-BR`
    Bcp,
    /// `pt-rBR`, as in `values-pt-rBR`
    Android,
}

/// Header values refreshed when a file is written.
#[derive(Debug, Clone, Default)]
pub struct HeaderUpdate {
    pub language: String,
    pub language_name: String,
    pub plural_forms: String,
    /// Number of plural forms, the `nplurals` of `plural_forms`.
    pub plural_count: usize,
    pub last_translator: Option<String>,
    pub revision_date: Option<DateTime<Utc>>,
    pub project: String,
}

/// One file format.
pub trait FileFormat: Send + Sync + std::fmt::Debug {
    /// Registry id, the `file_format` of a component.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    /// Keys in the file, source text in a template.
    fn monolingual(&self) -> bool {
        false
    }

    fn encoding(&self) -> Encoding {
        Encoding::Utf8
    }

    /// Glob patterns of file names this format is detected from.
    fn autoload(&self) -> &'static [&'static str];

    fn code_style(&self) -> CodeStyle {
        CodeStyle::Posix
    }

    /// Quality check flags implied for every unit.
    fn check_flags(&self) -> &'static [&'static str] {
        &[]
    }

    /// Parses decoded file content.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Parse` naming `path` for malformed content.
    fn parse(&self, path: &str, content: &str) -> Result<TranslationStore, FormatError>;

    /// Writes a store back to text.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Serialize` if the store cannot be represented.
    fn serialize(&self, store: &TranslationStore) -> Result<String, FormatError>;

    /// Store of a new file when no base file is configured, if allowed.
    fn empty_store(&self) -> Option<TranslationStore> {
        None
    }

    /// Refreshes header fields; formats without a header ignore this.
    fn update_header(&self, _store: &mut TranslationStore, _update: &HeaderUpdate) {}

    /// Canonical code in this format's spelling.
    fn language_code(&self, code: &str) -> String {
        match self.code_style() {
            CodeStyle::Posix => code.to_string(),
            CodeStyle::Bcp => code.replace('_', "-"),
            CodeStyle::Android => code.replacen('_', "-r", 1),
        }
    }

    /// Code found in a file name, normalized to canonical form.
    fn parse_language_code(&self, raw: &str) -> String {
        language::normalize_code(raw)
    }
}

/// Parsed store with the revision of the bytes it came from.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub store: TranslationStore,
    pub revision: String,
}

/// Reads, fingerprints and parses a file.
///
/// # Errors
///
/// Returns `FsError` if the file cannot be read, or `FormatError::Parse`.
pub fn load(format: &dyn FileFormat, path: &Path) -> SyncResult<LoadedFile> {
    let bytes = std::fs::read(path).map_err(|e| FsError::io(path, e))?;
    let revision = content_revision(&bytes);
    let text = decode(format.encoding(), &bytes);
    let store = format.parse(&path.display().to_string(), &text)?;
    debug!(path = %path.display(), units = store.units.len(), "loaded translation file");
    Ok(LoadedFile { store, revision })
}

/// Serializes and atomically writes a store; returns the new revision.
///
/// # Errors
///
/// Returns `FormatError::Serialize` or an `FsError` from the write.
pub fn save(format: &dyn FileFormat, path: &Path, store: &TranslationStore) -> SyncResult<String> {
    let text = format.serialize(store)?;
    let bytes = encode(format.encoding(), &text);
    write_atomic(path, &bytes)?;
    Ok(content_revision(&bytes))
}

/// File name for a language: the mask with `*` replaced by the code.
#[must_use]
pub fn get_language_filename(mask: &str, code: &str) -> String {
    mask.replace('*', code)
}

/// Checks that `base` can seed new translations.
///
/// An empty base is acceptable when the format can start from nothing.
///
/// # Errors
///
/// Returns `FormatError::Unsupported` without the capability, or
/// `FormatError::InvalidBase` when the base is missing or unparseable.
pub fn is_valid_base_for_new(format: &dyn FileFormat, base: Option<&Path>) -> Result<(), FormatError> {
    if !format.capabilities().contains(Capabilities::NEW_TRANSLATION) {
        return Err(FormatError::Unsupported {
            format: format.id().to_string(),
            operation: "adding new translations",
        });
    }
    let Some(base) = base else {
        return if format.empty_store().is_some() {
            Ok(())
        } else {
            Err(FormatError::InvalidBase {
                path: String::new(),
                reason: "a base file is required".to_string(),
            })
        };
    };
    let invalid = |reason: String| FormatError::InvalidBase {
        path: base.display().to_string(),
        reason,
    };
    let bytes = std::fs::read(base).map_err(|e| invalid(e.to_string()))?;
    let text = decode(format.encoding(), &bytes);
    format
        .parse(&base.display().to_string(), &text)
        .map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

/// Writes an untranslated file for a new language.
///
/// # Errors
///
/// Returns the errors of [`is_valid_base_for_new`], [`load`] and [`save`].
pub fn create_new_file(
    format: &dyn FileFormat,
    dest: &Path,
    base: Option<&Path>,
    update: &HeaderUpdate,
) -> SyncResult<String> {
    is_valid_base_for_new(format, base)?;
    let mut store = match base {
        Some(base) => {
            let mut store = load(format, base)?.store;
            store.untranslate(update.plural_count);
            store
        }
        None => format.empty_store().unwrap_or_default(),
    };
    format.update_header(&mut store, update);
    save(format, dest, &store)
}
