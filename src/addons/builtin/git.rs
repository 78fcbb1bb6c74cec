// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Squashing of outgoing commits before a push.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ALL_SCOPES, to_configuration};
use crate::addons::{
    AddonContext, AddonFuture, AddonHandler, AddonMetadata, Compatibility, parse_configuration,
};
use crate::discovery::MaskMatcher;
use crate::error::{AddonError, SyncResult};
use crate::models::{AddonEvent, VcsKind};

pub(super) static METADATA: AddonMetadata = AddonMetadata {
    name: "git.squash",
    verbose: "Squash Git commits",
    description: "Squash Git commits prior to pushing changes.",
    events: &[AddonEvent::PrePush],
    compatibility: Compatibility {
        formats: &[],
        vcs: &[VcsKind::Git, VcsKind::GitHub, VcsKind::Gerrit],
        monolingual: None,
    },
    scopes: ALL_SCOPES,
    multiple: false,
};

/// How outgoing commits are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SquashMode {
    /// One commit.
    #[default]
    All,
    /// One commit per language.
    Language,
    /// One commit per file.
    File,
    /// One commit per author.
    Author,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SquashConfig {
    squash: SquashMode,
}

#[derive(Debug)]
struct SquashAddon {
    config: SquashConfig,
}

pub(super) fn create(configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    let config = parse_configuration(METADATA.name, configuration)?;
    Ok(Box::new(SquashAddon { config }))
}

impl SquashAddon {
    async fn run(&self, ctx: &AddonContext<'_>) -> SyncResult<()> {
        let Some(git) = ctx.handle.repository.as_git() else {
            return Err(AddonError::Incompatible {
                addon: METADATA.name.to_string(),
                component: ctx.component().full_slug(),
            }
            .into());
        };
        match self.config.squash {
            SquashMode::All => git.squash_all(ctx.guard).await,
            SquashMode::Author => git.squash_author(ctx.guard).await,
            SquashMode::File => git.squash_file(ctx.guard).await,
            SquashMode::Language => {
                let settings = &ctx.component().settings;
                let matcher = MaskMatcher::for_mask(&settings.filemask, ".*")?;
                git.squash_paths(ctx.guard, move |path| {
                    matcher
                        .match_path(path)
                        .map(|found| found.language)
                        .unwrap_or_default()
                })
                .await
            }
        }
    }
}

impl AddonHandler for SquashAddon {
    fn metadata(&self) -> &'static AddonMetadata {
        &METADATA
    }

    fn configuration(&self) -> Value {
        to_configuration(&self.config)
    }

    fn pre_push<'a>(&'a self, ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        Box::pin(self.run(ctx))
    }
}
