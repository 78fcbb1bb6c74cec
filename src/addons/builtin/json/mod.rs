// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Key order and indentation of JSON files.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use super::{ALL_SCOPES, to_configuration};
use crate::addons::{
    AddonContext, AddonFuture, AddonHandler, AddonMetadata, Compatibility, parse_configuration,
};
use crate::error::{AddonError, FormatError, FsError, SyncResult};
use crate::models::{AddonEvent, Translation};
use crate::utility::fs::write_atomic;

pub(super) static METADATA: AddonMetadata = AddonMetadata {
    name: "json.customize",
    verbose: "Customize JSON output",
    description: "Allows adjusting JSON output behavior, for example indentation or sorting.",
    events: &[AddonEvent::PreCommit],
    compatibility: Compatibility {
        formats: &["json", "json-nested", "webextension"],
        vcs: &[],
        monolingual: None,
    },
    scopes: ALL_SCOPES,
    multiple: false,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum IndentStyle {
    #[default]
    Spaces,
    Tabs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct JsonConfig {
    sort_keys: bool,
    indent: usize,
    style: IndentStyle,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            sort_keys: false,
            indent: 4,
            style: IndentStyle::Spaces,
        }
    }
}

#[derive(Debug)]
struct JsonAddon {
    config: JsonConfig,
}

pub(super) fn create(configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    let config: JsonConfig = parse_configuration(METADATA.name, configuration)?;
    if config.indent > 16 {
        return Err(AddonError::InvalidConfiguration {
            addon: METADATA.name.to_string(),
            message: format!("indent of {} is out of range", config.indent),
        });
    }
    Ok(Box::new(JsonAddon { config }))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

impl JsonAddon {
    /// Re-serializes `content` with the configured layout.
    fn reformat(&self, path: &str, content: &str) -> Result<String, FormatError> {
        let mut value: Value = serde_json::from_str(content).map_err(|e| FormatError::parse(path, e))?;
        if self.config.sort_keys {
            value = sort_keys(value);
        }
        let indent = match self.config.style {
            IndentStyle::Spaces => " ".repeat(self.config.indent),
            IndentStyle::Tabs => "\t".repeat(self.config.indent.max(1)),
        };
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
        value
            .serialize(&mut serializer)
            .map_err(|e| FormatError::Serialize {
                format: "json".to_string(),
                message: e.to_string(),
            })?;
        let mut text = String::from_utf8_lossy(&out).into_owned();
        text.push('\n');
        Ok(text)
    }

    async fn run(&self, ctx: &AddonContext<'_>, translation: &Translation) -> SyncResult<()> {
        let path = ctx.path(&translation.filename);
        let content = std::fs::read_to_string(&path).map_err(|e| FsError::io(&path, e))?;
        let formatted = self.reformat(&translation.filename, &content)?;
        if formatted != content {
            write_atomic(&path, formatted.as_bytes())?;
            ctx.mark_changed(translation.filename.clone());
        }
        Ok(())
    }
}

impl AddonHandler for JsonAddon {
    fn metadata(&self) -> &'static AddonMetadata {
        &METADATA
    }

    fn configuration(&self) -> Value {
        to_configuration(&self.config)
    }

    fn pre_commit<'a>(
        &'a self,
        ctx: &'a AddonContext<'a>,
        translation: &'a Translation,
        _author: &'a str,
    ) -> AddonFuture<'a> {
        Box::pin(self.run(ctx, translation))
    }
}

#[cfg(test)]
mod tests;
