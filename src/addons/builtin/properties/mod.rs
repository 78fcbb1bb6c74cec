// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sorting of Java properties files.

use serde_json::Value;

use super::{ALL_SCOPES, NoConfig};
use crate::addons::{
    AddonContext, AddonFuture, AddonHandler, AddonMetadata, Compatibility, parse_configuration,
};
use crate::error::{AddonError, SyncResult};
use crate::formats::{self, TranslationStore};
use crate::models::{AddonEvent, Translation};

pub(super) static METADATA: AddonMetadata = AddonMetadata {
    name: "properties.sort",
    verbose: "Format the Java properties file",
    description: "Formats and sorts the Java properties file.",
    events: &[AddonEvent::PreCommit],
    compatibility: Compatibility {
        formats: &["properties", "properties-utf8", "properties-utf16"],
        vcs: &[],
        monolingual: None,
    },
    scopes: ALL_SCOPES,
    multiple: false,
};

#[derive(Debug)]
struct SortAddon;

pub(super) fn create(configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    let NoConfig {} = parse_configuration(METADATA.name, configuration)?;
    Ok(Box::new(SortAddon))
}

/// Orders units by key ignoring case; returns whether the order changed.
fn sort_units(store: &mut TranslationStore) -> bool {
    let before: Vec<String> = store.units.iter().map(|unit| unit.key().to_string()).collect();
    store
        .units
        .sort_by_cached_key(|unit| (unit.key().to_lowercase(), unit.key().to_string()));
    store
        .units
        .iter()
        .map(|unit| unit.key())
        .ne(before.iter().map(String::as_str))
}

impl SortAddon {
    async fn run(ctx: &AddonContext<'_>, translation: &Translation) -> SyncResult<()> {
        let path = ctx.path(&translation.filename);
        let format = ctx.handle.format.as_ref();
        let mut store = formats::load(format, &path)?.store;
        if sort_units(&mut store) {
            formats::save(format, &path, &store)?;
            ctx.mark_changed(translation.filename.clone());
        }
        Ok(())
    }
}

impl AddonHandler for SortAddon {
    fn metadata(&self) -> &'static AddonMetadata {
        &METADATA
    }

    fn pre_commit<'a>(
        &'a self,
        ctx: &'a AddonContext<'a>,
        translation: &'a Translation,
        _author: &'a str,
    ) -> AddonFuture<'a> {
        Box::pin(Self::run(ctx, translation))
    }
}
