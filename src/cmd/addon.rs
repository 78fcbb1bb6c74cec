// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Addon management commands.

use anyhow::Context;
use serde_json::Value;

use crate::addons::{self, InstallTarget};
use crate::cli::addon::{AddonArgs, AddonCommand, InstallArgs};
use crate::cmd::find_component;
use crate::db;
use crate::error::Result;
use crate::sync::Synchronizer;

/// Main handler for the addon command.
///
/// # Errors
///
/// Returns an error for an unknown target, a rejected install or a store
/// error.
pub async fn run_addon_command(args: &AddonArgs, sync: &Synchronizer) -> Result<()> {
    match &args.command {
        AddonCommand::List { installed: false } => {
            for metadata in sync.addon_registry().iter() {
                println!("{:<28} {}", metadata.name, metadata.verbose);
            }
        }
        AddonCommand::List { installed: true } => {
            let records = db::addons::list(sync.pool()).await?;
            if records.is_empty() {
                println!("No addons installed");
            }
            for record in records {
                let target = match (record.component_id, record.project_id) {
                    (Some(id), _) => db::components::get(sync.pool(), id).await?.full_slug(),
                    (None, Some(id)) => db::projects::get(sync.pool(), id).await?.slug,
                    (None, None) => "site".to_string(),
                };
                println!(
                    "{:>4} {:<28} {:<9} {} {}",
                    record.id, record.name, record.scope, target, record.configuration
                );
            }
        }
        AddonCommand::Install(install) => run_install(install, sync).await?,
        AddonCommand::Remove { id } => {
            if db::addons::remove(sync.pool(), *id).await? {
                println!("removed addon {id}");
            } else {
                anyhow::bail!("no addon with id {id}");
            }
        }
    }
    Ok(())
}

async fn run_install(args: &InstallArgs, sync: &Synchronizer) -> Result<()> {
    let configuration: Value = serde_json::from_str(&args.configuration)
        .with_context(|| format!("invalid addon configuration: {}", args.configuration))?;

    let record = if let Some(full_slug) = &args.component {
        let component = find_component(sync, full_slug).await?;
        let handle = sync.open(&component).await?;
        let target = InstallTarget::Component {
            component: &component,
            monolingual: handle.monolingual(),
        };
        addons::install(sync.pool(), sync.addon_registry(), target, &args.name, &configuration)
            .await?
    } else if let Some(slug) = &args.project {
        let project = db::projects::find_by_slug(sync.pool(), slug)
            .await?
            .ok_or_else(|| anyhow::anyhow!("unknown project '{slug}'"))?;
        addons::install(
            sync.pool(),
            sync.addon_registry(),
            InstallTarget::Project(&project),
            &args.name,
            &configuration,
        )
        .await?
    } else {
        addons::install(
            sync.pool(),
            sync.addon_registry(),
            InstallTarget::Site,
            &args.name,
            &configuration,
        )
        .await?
    };

    println!("installed {} as addon {}", record.name, record.id);
    Ok(())
}
