// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gettext addons: LINGUAS, msgmerge and MO files.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

use super::{ALL_SCOPES, NoConfig, to_configuration};
use crate::addons::{
    AddonContext, AddonFuture, AddonHandler, AddonMetadata, Compatibility, parse_configuration,
};
use crate::core::process::ProcessBuilder;
use crate::error::{AddonError, FsError, SyncResult};
use crate::models::{AddonEvent, Translation};
use crate::utility::fs::write_atomic;
use crate::utility::template::render;

const GETTEXT: Compatibility = Compatibility {
    formats: &["po"],
    vcs: &[],
    monolingual: Some(false),
};

pub(super) static LINGUAS: AddonMetadata = AddonMetadata {
    name: "gettext.linguas",
    verbose: "Update LINGUAS file",
    description: "Updates the LINGUAS file when a new translation is added.",
    events: &[AddonEvent::PostAdd, AddonEvent::Daily],
    compatibility: GETTEXT,
    scopes: ALL_SCOPES,
    multiple: false,
};

pub(super) static MSGMERGE: AddonMetadata = AddonMetadata {
    name: "gettext.msgmerge",
    verbose: "Update PO files to match POT (msgmerge)",
    description: "Updates all PO files to match the POT file using msgmerge.",
    events: &[AddonEvent::PostUpdate],
    compatibility: GETTEXT,
    scopes: ALL_SCOPES,
    multiple: false,
};

pub(super) static MO: AddonMetadata = AddonMetadata {
    name: "gettext.mo",
    verbose: "Generate MO files",
    description: "Automatically generates a MO file for every changed PO file.",
    events: &[AddonEvent::PreCommit],
    compatibility: Compatibility {
        formats: &["po"],
        vcs: &[],
        monolingual: None,
    },
    scopes: ALL_SCOPES,
    multiple: false,
};

/// Brings LINGUAS lines in line with `codes`.
///
/// Comments and blank lines are kept. A file listing every language on one
/// line gets that line rewritten; otherwise obsolete codes are removed and
/// missing ones appended in order. Running it again on its own output
/// reports no change.
#[must_use]
pub fn update_linguas(mut lines: Vec<String>, codes: &BTreeSet<String>) -> (bool, Vec<String>) {
    let mut missing = codes.clone();
    let mut obsolete = Vec::new();
    let mut changed = false;

    for (index, line) in lines.iter_mut().enumerate() {
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        if content.contains(char::is_whitespace) {
            let expected = codes.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
            if content != expected {
                *line = expected;
                changed = true;
            }
            missing.clear();
            obsolete.clear();
            break;
        }
        if !missing.remove(content) {
            obsolete.push(index);
        }
    }

    if !obsolete.is_empty() {
        for index in obsolete.into_iter().rev() {
            lines.remove(index);
        }
        changed = true;
    }
    if !missing.is_empty() {
        lines.extend(missing);
        changed = true;
    }
    (changed, lines)
}

/// Language codes of the non-source translations.
fn translation_codes(translations: &[Translation]) -> BTreeSet<String> {
    translations
        .iter()
        .filter(|t| !t.is_source)
        .map(|t| t.language_code.clone())
        .collect()
}

#[derive(Debug)]
struct LinguasAddon;

pub(super) fn create_linguas(configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    let NoConfig {} = parse_configuration(LINGUAS.name, configuration)?;
    Ok(Box::new(LinguasAddon))
}

impl LinguasAddon {
    /// `LINGUAS` next to the translation files.
    fn linguas_path(ctx: &AddonContext<'_>) -> String {
        let mask = &ctx.component().settings.filemask;
        match Path::new(mask).parent().and_then(Path::to_str) {
            Some(dir) if !dir.is_empty() => format!("{dir}/LINGUAS"),
            _ => "LINGUAS".to_string(),
        }
    }

    async fn sync(ctx: &AddonContext<'_>) -> SyncResult<()> {
        let relative = Self::linguas_path(ctx);
        let path = ctx.path(&relative);
        if !path.is_file() {
            debug!(path = %relative, "no LINGUAS file");
            return Ok(());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| FsError::io(&path, e))?;
        let lines = content.lines().map(str::to_string).collect();
        let codes = translation_codes(&ctx.translations().await?);

        let (changed, lines) = update_linguas(lines, &codes);
        if changed {
            let mut content = lines.join("\n");
            content.push('\n');
            write_atomic(&path, content.as_bytes())?;
            ctx.mark_changed(relative);
            ctx.commit_changes(LINGUAS.name).await?;
        }
        Ok(())
    }
}

impl AddonHandler for LinguasAddon {
    fn metadata(&self) -> &'static AddonMetadata {
        &LINGUAS
    }

    fn post_add<'a>(&'a self, ctx: &'a AddonContext<'a>, _translation: &'a Translation) -> AddonFuture<'a> {
        Box::pin(Self::sync(ctx))
    }

    fn daily<'a>(&'a self, ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        Box::pin(Self::sync(ctx))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MsgmergeConfig {
    /// Keep previous msgids of fuzzy entries.
    previous: bool,
    /// Use fuzzy matching.
    fuzzy: bool,
}

impl Default for MsgmergeConfig {
    fn default() -> Self {
        Self {
            previous: true,
            fuzzy: true,
        }
    }
}

#[derive(Debug)]
struct MsgmergeAddon {
    config: MsgmergeConfig,
}

pub(super) fn create_msgmerge(configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    let config = parse_configuration(MSGMERGE.name, configuration)?;
    Ok(Box::new(MsgmergeAddon { config }))
}

impl MsgmergeAddon {
    async fn run(&self, ctx: &AddonContext<'_>) -> SyncResult<()> {
        let template = &ctx.component().settings.new_base;
        if template.is_empty() || !ctx.path(template).is_file() {
            debug!(component = %ctx.component().full_slug(), "no POT file, msgmerge skipped");
            return Ok(());
        }

        for translation in ctx.translations().await? {
            if translation.is_source || !ctx.path(&translation.filename).is_file() {
                continue;
            }
            let mut command = ProcessBuilder::new("msgmerge").args(["--update", "--backup=none"]);
            if self.config.previous {
                command = command.arg("--previous");
            }
            if !self.config.fuzzy {
                command = command.arg("--no-fuzzy-matching");
            }
            command = command.args([translation.filename.as_str(), template.as_str()]);
            ctx.run_tool(MSGMERGE.name, command).await?;
            ctx.mark_changed(translation.filename);
        }

        if ctx.commit_changes(MSGMERGE.name).await? {
            info!(component = %ctx.component().full_slug(), "PO files merged with POT");
        }
        Ok(())
    }
}

impl AddonHandler for MsgmergeAddon {
    fn metadata(&self) -> &'static AddonMetadata {
        &MSGMERGE
    }

    fn configuration(&self) -> Value {
        to_configuration(&self.config)
    }

    fn post_update<'a>(
        &'a self,
        ctx: &'a AddonContext<'a>,
        _previous_revision: &'a str,
        _skip_push: bool,
    ) -> AddonFuture<'a> {
        Box::pin(self.run(ctx))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MoConfig {
    /// Template of the MO path; empty puts it next to the PO file.
    path: String,
}

#[derive(Debug)]
struct MoAddon {
    config: MoConfig,
}

pub(super) fn create_mo(configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    let config = parse_configuration(MO.name, configuration)?;
    Ok(Box::new(MoAddon { config }))
}

impl MoAddon {
    fn mo_path(&self, translation: &Translation) -> String {
        if self.config.path.is_empty() {
            let stem = translation
                .filename
                .strip_suffix(".po")
                .unwrap_or(&translation.filename);
            return format!("{stem}.mo");
        }
        render(
            &self.config.path,
            &json!({
                "language_code": translation.language_code,
                "filename": translation.filename,
            }),
        )
    }

    async fn run(&self, ctx: &AddonContext<'_>, translation: &Translation) -> SyncResult<()> {
        if translation.is_source {
            return Ok(());
        }
        let mo = self.mo_path(translation);
        if let Some(parent) = ctx.path(&mo).parent() {
            std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;
        }
        let command = ProcessBuilder::new("msgfmt").args(["-o", mo.as_str(), translation.filename.as_str()]);
        ctx.run_tool(MO.name, command).await?;
        ctx.mark_changed(mo);
        Ok(())
    }
}

impl AddonHandler for MoAddon {
    fn metadata(&self) -> &'static AddonMetadata {
        &MO
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
