// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! List command implementation for transync.

use crate::cli::component::ListArgs;
use crate::cmd::select_components;
use crate::config::Config;
use crate::error::Result;
use crate::sync::Synchronizer;

/// Prints the aliases of the configuration.
pub fn run_list_aliases(config: &Config) {
    if config.aliases.is_empty() {
        println!("No aliases defined");
    } else {
        for (name, targets) in &config.aliases {
            println!("{} = {}", name, targets.join(", "));
        }
    }
}

/// Main handler for list command.
///
/// # Errors
///
/// Returns an error if component resolution fails.
pub async fn run_list_command(args: &ListArgs, sync: &Synchronizer) -> Result<()> {
    let components = select_components(sync, &args.components).await?;

    if components.is_empty() {
        println!("No components found");
        return Ok(());
    }
    for component in &components {
        let mut line = format!("{:<30} {}", component.full_slug(), component.settings.filemask);
        if component.is_linked() {
            line.push_str(&format!(" ({})", component.settings.repo));
        }
        if component.locked {
            line.push_str(" [locked]");
        }
        println!("{line}");
    }
    Ok(())
}
