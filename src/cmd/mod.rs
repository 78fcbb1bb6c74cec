// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   config (options, inis), list, component, discover, addon, worker
//!        |
//!        v
//!   open_synchronizer: database + registered components
//! ```

pub mod addon;
pub mod component;
pub mod config;
pub mod discover;
pub mod list;
pub mod select;
pub mod worker;

use std::sync::Arc;

use crate::addons::AddonRegistry;
use crate::cmd::select::ComponentSelector;
use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::models::Component;
use crate::sync::Synchronizer;

/// Opens the database and registers the configured projects and components.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a configured
/// component is invalid.
pub async fn open_synchronizer(config: Config) -> Result<Synchronizer> {
    let pool = db::initialize(&config.paths.database()).await?;
    let sync = Synchronizer::new(
        pool,
        Arc::new(config),
        Arc::new(AddonRegistry::builtin()),
    );
    let registered = sync.register_from_config().await?;
    tracing::debug!(components = registered.len(), "configuration registered");
    Ok(sync)
}

/// Registered components matching the command-line arguments.
///
/// # Errors
///
/// Returns an error for an invalid pattern, when nothing matched, or a
/// store error.
pub async fn select_components(sync: &Synchronizer, specs: &[String]) -> Result<Vec<Component>> {
    let components = db::components::list(sync.pool()).await?;
    let mut selector = ComponentSelector::new(sync.config().aliases.clone());
    selector.register_all(components.iter().map(Component::full_slug));

    let slugs = selector.resolve(specs)?;
    Ok(slugs
        .iter()
        .filter_map(|slug| components.iter().find(|c| &c.full_slug() == slug))
        .cloned()
        .collect())
}

/// Looks up one registered component by `project/slug`.
///
/// # Errors
///
/// Returns an error if the argument is malformed or unknown.
pub async fn find_component(sync: &Synchronizer, full_slug: &str) -> Result<Component> {
    let Some((project, slug)) = full_slug.split_once('/') else {
        anyhow::bail!("expected 'project/component', got '{full_slug}'");
    };
    db::components::find(sync.pool(), project, slug)
        .await?
        .ok_or_else(|| anyhow::anyhow!("unknown component '{full_slug}'"))
}
