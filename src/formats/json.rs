// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! JSON key/value files.
//!
//! ```text
//! json           {"hello": "Hallo"}                   key "hello"
//! json-nested    {"menu": {"file": "Datei"}}          key "menu.file"
//! webextension   {"hello": {"message": "Hallo",       key "hello"
//!                           "description": "..."}}    explanation
//! ```

use serde_json::{Map, Value};

use super::store::{TranslationStore, TranslationUnit};
use super::{Capabilities, CodeStyle, FileFormat};
use crate::error::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Flat,
    Nested,
    WebExtension,
}

/// JSON format family.
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat {
    layout: Layout,
}

impl JsonFormat {
    #[must_use]
    pub const fn flat() -> Self {
        Self {
            layout: Layout::Flat,
        }
    }

    #[must_use]
    pub const fn nested() -> Self {
        Self {
            layout: Layout::Nested,
        }
    }

    #[must_use]
    pub const fn webextension() -> Self {
        Self {
            layout: Layout::WebExtension,
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn flatten(prefix: &str, map: &Map<String, Value>, units: &mut Vec<TranslationUnit>) {
    for (key, value) in map {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten(&full, inner, units),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if let Some(text) = scalar_text(item) {
                        units.push(TranslationUnit::keyed(format!("{full}.{index}"), text));
                    }
                }
            }
            scalar => {
                if let Some(text) = scalar_text(scalar) {
                    units.push(TranslationUnit::keyed(full, text));
                }
            }
        }
    }
}

fn insert_nested(root: &mut Map<String, Value>, key: &str, value: Value) -> Result<(), FormatError> {
    let mut parts = key.split('.').peekable();
    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_string(), value);
            return Ok(());
        }
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = entry.as_object_mut().ok_or_else(|| FormatError::Serialize {
            format: "json-nested".to_string(),
            message: format!("key {key} conflicts with a value at {part}"),
        })?;
    }
    Ok(())
}

impl FileFormat for JsonFormat {
    fn id(&self) -> &'static str {
        match self.layout {
            Layout::Flat => "json",
            Layout::Nested => "json-nested",
            Layout::WebExtension => "webextension",
        }
    }

    fn name(&self) -> &'static str {
        match self.layout {
            Layout::Flat => "JSON file",
            Layout::Nested => "JSON nested structure file",
            Layout::WebExtension => "WebExtension JSON file",
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NEW_TRANSLATION | Capabilities::ADD_UNIT
    }

    fn monolingual(&self) -> bool {
        true
    }

    fn autoload(&self) -> &'static [&'static str] {
        match self.layout {
            Layout::Flat => &["**/*.json"],
            Layout::Nested => &[],
            Layout::WebExtension => &["**/_locales/*/messages.json"],
        }
    }

    fn code_style(&self) -> CodeStyle {
        match self.layout {
            Layout::WebExtension => CodeStyle::Posix,
            Layout::Flat | Layout::Nested => CodeStyle::Bcp,
        }
    }

    fn check_flags(&self) -> &'static [&'static str] {
        match self.layout {
            Layout::WebExtension => &["placeholders"],
            Layout::Flat | Layout::Nested => &[],
        }
    }

    fn parse(&self, path: &str, content: &str) -> Result<TranslationStore, FormatError> {
        let mut store = TranslationStore::default();
        if content.trim().is_empty() {
            return Ok(store);
        }
        let value: Value = serde_json::from_str(content).map_err(|e| FormatError::parse(path, e))?;
        let Value::Object(map) = value else {
            return Err(FormatError::parse(path, "top level value must be an object"));
        };

        match self.layout {
            Layout::Flat => {
                for (key, value) in &map {
                    let text = scalar_text(value).ok_or_else(|| {
                        FormatError::parse(path, format!("value of {key} is not a string"))
                    })?;
                    store.units.push(TranslationUnit::keyed(key.clone(), text));
                }
            }
            Layout::Nested => flatten("", &map, &mut store.units),
            Layout::WebExtension => {
                for (key, value) in &map {
                    let message = value
                        .get("message")
                        .and_then(Value::as_str)
                        .ok_or_else(|| FormatError::parse(path, format!("{key} has no message")))?;
                    let mut unit = TranslationUnit::keyed(key.clone(), message);
                    if let Some(description) = value.get("description").and_then(Value::as_str) {
                        unit.explanation = description.to_string();
                    }
                    if let Some(placeholders) = value.get("placeholders") {
                        unit.notes.push(placeholders.to_string());
                    }
                    store.units.push(unit);
                }
            }
        }
        Ok(store)
    }

    fn serialize(&self, store: &TranslationStore) -> Result<String, FormatError> {
        let mut root = Map::new();
        for unit in &store.units {
            match self.layout {
                Layout::Flat => {
                    root.insert(unit.context.clone(), Value::String(unit.target.clone()));
                }
                Layout::Nested => {
                    insert_nested(&mut root, &unit.context, Value::String(unit.target.clone()))?;
                }
                Layout::WebExtension => {
                    let mut entry = Map::new();
                    entry.insert("message".to_string(), Value::String(unit.target.clone()));
                    if !unit.explanation.is_empty() {
                        entry.insert(
                            "description".to_string(),
                            Value::String(unit.explanation.clone()),
                        );
                    }
                    if let Some(placeholders) = unit
                        .notes
                        .first()
                        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
                    {
                        entry.insert("placeholders".to_string(), placeholders);
                    }
                    root.insert(unit.context.clone(), Value::Object(entry));
                }
            }
        }
        let mut text =
            serde_json::to_string_pretty(&Value::Object(root)).map_err(|e| FormatError::Serialize {
                format: self.id().to_string(),
                message: e.to_string(),
            })?;
        text.push('\n');
        Ok(text)
    }

    fn empty_store(&self) -> Option<TranslationStore> {
        Some(TranslationStore::default())
    }
}
