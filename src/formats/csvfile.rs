// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bilingual CSV files.
//!
//! ```text
//! context,source,target,developer_comments,fuzzy
//! menu,File,Datei,,
//! ```
//!
//! Files without a header row are read as `source,target` (two columns)
//! or `context,source,target` (three or more).

use super::store::{TranslationStore, TranslationUnit};
use super::{Capabilities, FileFormat};
use crate::error::FormatError;

const COLUMNS: [&str; 5] = ["context", "source", "target", "developer_comments", "fuzzy"];

/// Bilingual CSV with a context, source and target column.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormat;

#[derive(Debug, Default)]
struct Layout {
    context: Option<usize>,
    source: usize,
    target: usize,
    explanation: Option<usize>,
    fuzzy: Option<usize>,
}

impl Layout {
    fn from_header(record: &csv::StringRecord) -> Option<Self> {
        let find = |names: &[&str]| {
            record
                .iter()
                .position(|field| names.iter().any(|name| field.trim().eq_ignore_ascii_case(name)))
        };
        Some(Self {
            context: find(&["context", "location", "key"]),
            source: find(&["source"])?,
            target: find(&["target", "translation"])?,
            explanation: find(&["developer_comments", "comment"]),
            fuzzy: find(&["fuzzy"]),
        })
    }

    const fn headerless(width: usize) -> Self {
        if width >= 3 {
            Self {
                context: Some(0),
                source: 1,
                target: 2,
                explanation: None,
                fuzzy: None,
            }
        } else {
            Self {
                context: None,
                source: 0,
                target: 1,
                explanation: None,
                fuzzy: None,
            }
        }
    }

    fn unit(&self, record: &csv::StringRecord) -> TranslationUnit {
        let field = |index: Option<usize>| {
            index
                .and_then(|index| record.get(index))
                .unwrap_or_default()
                .to_string()
        };
        let mut unit = TranslationUnit::bilingual(field(Some(self.source)), field(Some(self.target)));
        unit.context = field(self.context);
        unit.explanation = field(self.explanation);
        unit.fuzzy = matches!(field(self.fuzzy).trim(), "1" | "true" | "True" | "yes");
        unit
    }
}

impl FileFormat for CsvFormat {
    fn id(&self) -> &'static str {
        "csv"
    }

    fn name(&self) -> &'static str {
        "CSV file"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NEW_TRANSLATION | Capabilities::ADD_UNIT | Capabilities::FUZZY
    }

    fn autoload(&self) -> &'static [&'static str] {
        &["**/*.csv"]
    }

    fn parse(&self, path: &str, content: &str) -> Result<TranslationStore, FormatError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut store = TranslationStore::default();
        let mut layout: Option<Layout> = None;

        for record in reader.records() {
            let record = record.map_err(|e| FormatError::parse(path, e))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            if layout.is_none() {
                if let Some(header) = Layout::from_header(&record) {
                    layout = Some(header);
                    continue;
                }
            }
            let layout = layout.get_or_insert_with(|| Layout::headerless(record.len()));
            store.units.push(layout.unit(&record));
        }
        Ok(store)
    }

    fn serialize(&self, store: &TranslationStore) -> Result<String, FormatError> {
        let failed = |e: csv::Error| FormatError::Serialize {
            format: "csv".to_string(),
            message: e.to_string(),
        };
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(COLUMNS).map_err(failed)?;
        for unit in &store.units {
            writer
                .write_record([
                    unit.context.as_str(),
                    unit.source.as_str(),
                    unit.target.as_str(),
                    unit.explanation.as_str(),
                    if unit.fuzzy { "true" } else { "" },
                ])
                .map_err(failed)?;
        }
        let bytes = writer.into_inner().map_err(|e| FormatError::Serialize {
            format: "csv".to_string(),
            message: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| FormatError::Serialize {
            format: "csv".to_string(),
            message: e.to_string(),
        })
    }
}
