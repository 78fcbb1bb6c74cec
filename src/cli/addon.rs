// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Addon command arguments.

use clap::{Args, Subcommand};

/// Arguments for the `addon` command.
#[derive(Debug, Clone, Args)]
pub struct AddonArgs {
    #[command(subcommand)]
    pub command: AddonCommand,
}

/// Addon subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum AddonCommand {
    /// Lists the known addons, or the installed ones with --installed.
    List {
        /// Lists installed addon instances.
        #[arg(long)]
        installed: bool,
    },

    /// Installs an addon on a component, a project or the whole site.
    Install(InstallArgs),

    /// Removes an installed addon by id.
    Remove {
        /// Id shown by `addon list --installed`.
        #[arg(value_name = "ID")]
        id: i64,
    },
}

/// Arguments for `addon install`.
#[derive(Debug, Clone, Args)]
#[command(group(clap::ArgGroup::new("target").required(true).multiple(false)))]
pub struct InstallArgs {
    /// Addon name, such as `gettext.linguas`.
    #[arg(value_name = "ADDON")]
    pub name: String,

    /// Component, as `project/slug`.
    #[arg(short, long, group = "target")]
    pub component: Option<String>,

    /// Project slug.
    #[arg(short, long, group = "target")]
    pub project: Option<String>,

    /// Installs for every component.
    #[arg(long, group = "target")]
    pub site: bool,

    /// Addon configuration as JSON.
    #[arg(long, value_name = "JSON", default_value = "null")]
    pub configuration: String,
}
