// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Removal of keys that left the template.

use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

use super::{ALL_SCOPES, NoConfig};
use crate::addons::{
    AddonContext, AddonFuture, AddonHandler, AddonMetadata, Compatibility, parse_configuration,
};
use crate::error::{AddonError, SyncResult};
use crate::formats::{self, TranslationStore};
use crate::models::{AddonEvent, Translation};

pub(super) static METADATA: AddonMetadata = AddonMetadata {
    name: "cleanup.generic",
    verbose: "Cleanup translation files",
    description: "Update all translation files to match the monolingual base file. Removes keys no longer present in the template.",
    events: &[AddonEvent::PreCommit, AddonEvent::PostUpdate],
    compatibility: Compatibility {
        formats: &[],
        vcs: &[],
        monolingual: Some(true),
    },
    scopes: ALL_SCOPES,
    multiple: false,
};

#[derive(Debug)]
struct CleanupAddon;

pub(super) fn create(configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    let NoConfig {} = parse_configuration(METADATA.name, configuration)?;
    Ok(Box::new(CleanupAddon))
}

/// Drops units whose key is not in `keys`; returns how many went.
fn retain_keys(store: &mut TranslationStore, keys: &HashSet<String>) -> usize {
    let before = store.units.len();
    store.units.retain(|unit| keys.contains(unit.key()));
    before - store.units.len()
}

impl CleanupAddon {
    fn template_keys(ctx: &AddonContext<'_>) -> SyncResult<Option<HashSet<String>>> {
        let template = &ctx.component().settings.template;
        if template.is_empty() {
            return Ok(None);
        }
        let store = formats::load(ctx.handle.format.as_ref(), &ctx.path(template))?.store;
        Ok(Some(
            store.units.iter().map(|unit| unit.key().to_string()).collect(),
        ))
    }

    fn clean(ctx: &AddonContext<'_>, keys: &HashSet<String>, translation: &Translation) -> SyncResult<()> {
        let path = ctx.path(&translation.filename);
        if translation.is_source || !path.is_file() {
            return Ok(());
        }
        let format = ctx.handle.format.as_ref();
        let mut store = formats::load(format, &path)?.store;
        let removed = retain_keys(&mut store, keys);
        if removed > 0 {
            formats::save(format, &path, &store)?;
            info!(file = %translation.filename, removed, "removed keys missing from the template");
            ctx.mark_changed(translation.filename.clone());
        }
        Ok(())
    }

    async fn clean_one(ctx: &AddonContext<'_>, translation: &Translation) -> SyncResult<()> {
        if let Some(keys) = Self::template_keys(ctx)? {
            Self::clean(ctx, &keys, translation)?;
        }
        Ok(())
    }

    async fn clean_all(ctx: &AddonContext<'_>) -> SyncResult<()> {
        let Some(keys) = Self::template_keys(ctx)? else {
            return Ok(());
        };
        for translation in ctx.translations().await? {
            Self::clean(ctx, &keys, &translation)?;
        }
        ctx.commit_changes(METADATA.name).await?;
        Ok(())
    }
}

impl AddonHandler for CleanupAddon {
    fn metadata(&self) -> &'static AddonMetadata {
        &METADATA
    }

    fn pre_commit<'a>(
        &'a self,
        ctx: &'a AddonContext<'a>,
        translation: &'a Translation,
        _author: &'a str,
    ) -> AddonFuture<'a> {
        Box::pin(Self::clean_one(ctx, translation))
    }

    fn post_update<'a>(
        &'a self,
        ctx: &'a AddonContext<'a>,
        _previous_revision: &'a str,
        _skip_push: bool,
    ) -> AddonFuture<'a> {
        Box::pin(Self::clean_all(ctx))
    }
}
