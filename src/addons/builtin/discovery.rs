// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Component discovery after every update.

use serde_json::Value;
use tracing::{info, warn};

use super::to_configuration;
use crate::addons::{
    AddonContext, AddonFuture, AddonHandler, AddonMetadata, Compatibility, parse_configuration,
};
use crate::db;
use crate::discovery::{DiscoveryConfig, KnownComponent, MaskMatcher, discover, mask_matches};
use crate::error::{AddonError, SyncResult};
use crate::models::{AddonEvent, AddonScope, LINK_PREFIX};

pub(super) static METADATA: AddonMetadata = AddonMetadata {
    name: "discovery.discovery",
    verbose: "Component discovery",
    description: "Automatically adds or removes project components based on file changes in the version control system.",
    events: &[AddonEvent::PostUpdate],
    compatibility: Compatibility::ANY,
    scopes: &[AddonScope::Component],
    multiple: true,
};

#[derive(Debug)]
struct DiscoveryAddon {
    config: DiscoveryConfig,
}

pub(super) fn create(configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    let config: DiscoveryConfig = parse_configuration(METADATA.name, configuration)?;
    MaskMatcher::new(&config.match_regex, &config.language_regex).map_err(|e| {
        AddonError::InvalidConfiguration {
            addon: METADATA.name.to_string(),
            message: e.to_string(),
        }
    })?;
    Ok(Box::new(DiscoveryAddon { config }))
}

impl DiscoveryAddon {
    async fn run(&self, ctx: &AddonContext<'_>) -> SyncResult<()> {
        let project = ctx.project();
        let existing: Vec<KnownComponent> = db::components::list_for_project(ctx.pool, project.id)
            .await?
            .into_iter()
            .map(|component| KnownComponent {
                name: component.name,
                slug: component.slug,
                filemask: component.settings.filemask,
            })
            .collect();

        let result = discover(&ctx.handle.checkout, &self.config, &existing)?;
        for (skipped, reason) in &result.skipped {
            warn!(component = %ctx.component().full_slug(), mask = %skipped.mask, reason = %reason, "discovered component skipped");
        }

        let origin = &ctx.handle.origin;
        for found in &result.created {
            let mut settings = origin.settings.clone();
            settings.name.clone_from(&found.name);
            settings.repo = format!("{LINK_PREFIX}{}", origin.full_slug());
            settings.push.clear();
            settings.filemask.clone_from(&found.mask);
            settings.file_format.clone_from(&self.config.file_format);
            settings.template.clone_from(&found.base_file);
            settings.new_base.clone_from(&found.new_base);
            settings.language_regex.clone_from(&self.config.language_regex);

            let component = db::components::upsert(ctx.pool, project, &found.slug, &settings).await?;
            info!(component = %component.full_slug(), mask = %found.mask, "discovered component created");
            ctx.request_scan(component.id);
        }

        if self.config.remove {
            self.remove_vanished(ctx).await?;
        }
        Ok(())
    }

    async fn remove_vanished(&self, ctx: &AddonContext<'_>) -> SyncResult<()> {
        let origin = &ctx.handle.origin;
        let link = format!("{LINK_PREFIX}{}", origin.full_slug());
        for component in db::components::list_for_project(ctx.pool, ctx.project().id).await? {
            if component.settings.repo != link {
                continue;
            }
            let settings = &component.settings;
            if !mask_matches(&ctx.handle.checkout, &settings.filemask, &settings.language_regex)?.is_empty() {
                continue;
            }
            db::components::delete(ctx.pool, component.id).await?;
            info!(component = %component.full_slug(), mask = %settings.filemask, "discovered component removed");
        }
        Ok(())
    }
}

impl AddonHandler for DiscoveryAddon {
    fn metadata(&self) -> &'static AddonMetadata {
        &METADATA
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
