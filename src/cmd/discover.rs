// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Discover command: previews or installs component discovery.

use crate::addons::{self, InstallTarget};
use crate::cli::component::DiscoverArgs;
use crate::cmd::find_component;
use crate::db;
use crate::discovery::{DiscoveryConfig, DiscoveryResult, KnownComponent, discover};
use crate::error::Result;
use crate::sync::Synchronizer;

const DISCOVERY_ADDON: &str = "discovery.discovery";

impl From<&DiscoverArgs> for DiscoveryConfig {
    fn from(args: &DiscoverArgs) -> Self {
        Self {
            match_regex: args.match_regex.clone(),
            name_template: args.name_template.clone(),
            base_file_template: args.base_file_template.clone(),
            new_base_template: args.new_base_template.clone(),
            file_format: args.file_format.clone(),
            language_regex: args.language_regex.clone(),
            remove: args.remove,
            ..Self::default()
        }
    }
}

fn print_result(result: &DiscoveryResult) {
    for found in &result.created {
        let languages: Vec<&str> = found.languages.iter().map(String::as_str).collect();
        println!("new      {:<24} {} [{}]", found.slug, found.mask, languages.join(", "));
    }
    for found in &result.matched {
        println!("existing {:<24} {}", found.slug, found.mask);
    }
    for (found, reason) in &result.skipped {
        println!("skipped  {:<24} {} ({reason})", found.slug, found.mask);
    }
    if result.created.is_empty() && result.matched.is_empty() && result.skipped.is_empty() {
        println!("No components found");
    }
}

/// Lists the components a discovery run would create; with `--install`,
/// installs the discovery addon and runs it through a forced update.
///
/// # Errors
///
/// Returns an error for an unknown component, an invalid match expression
/// or a failed install.
pub async fn run_discover_command(args: &DiscoverArgs, sync: &Synchronizer) -> Result<()> {
    let component = find_component(sync, &args.component).await?;
    let config = DiscoveryConfig::from(args);
    let handle = sync.open(&component).await?;

    let existing: Vec<KnownComponent> =
        db::components::list_for_project(sync.pool(), component.project_id)
            .await?
            .into_iter()
            .map(|c| KnownComponent {
                name: c.name,
                slug: c.slug,
                filemask: c.settings.filemask,
            })
            .collect();
    let result = discover(&handle.checkout, &config, &existing)?;
    print_result(&result);

    if args.install {
        let target = InstallTarget::Component {
            component: &component,
            monolingual: handle.monolingual(),
        };
        let record = addons::install(
            sync.pool(),
            sync.addon_registry(),
            target,
            DISCOVERY_ADDON,
            &serde_json::to_value(&config)?,
        )
        .await?;
        println!("installed {} as addon {}", DISCOVERY_ADDON, record.id);
        sync.update(component.id, true).await?;
    }
    Ok(())
}
