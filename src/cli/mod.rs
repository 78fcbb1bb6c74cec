// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for transync using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! transync [global options] <command>
//! version | options | inis
//! setup | list | status
//! update | commit | push | reset | cleanup | lock | unlock   [COMPONENT...]
//! add-language COMPONENT LANGUAGE
//! delete COMPONENT
//! translate UNIT TARGET --author
//! discover COMPONENT --match REGEX
//! addon {list|install|remove}
//! daily | worker
//! ```

pub mod addon;
pub mod component;
pub mod global;
pub mod worker;


use crate::cli::addon::AddonArgs;
use crate::cli::component::{
    AddLanguageArgs, DeleteArgs, DiscoverArgs, ListArgs, SelectArgs, StatusArgs, TranslateArgs,
    UpdateArgs,
};
use crate::cli::global::GlobalOptions;
use crate::cli::worker::{DailyArgs, WorkerArgs};
use clap::{Parser, Subcommand};

/// Translation Repository Synchronizer
///
/// Keeps translation files in version control in sync with a database of
/// translations.
#[derive(Debug, Parser)]
#[command(
    name = "transync",
    author,
    version,
    about = "Translation Repository Synchronizer",
    long_about = "transync Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Keeps translation files in version control repositories in\n\
                  sync with a database of translations.\n\n\
                  Run `transync setup` to clone and scan the configured\n\
                  components, then `transync worker` to keep them updated.\n\
                  See `transync <command> --help` for more information.",
    after_help = "CONFIGURATION:\n\n\
                  By default, transync loads `transync.toml` from the current\n\
                  directory. Additional files can be given with --ini and are\n\
                  loaded in order, later files overriding earlier ones.\n\
                  TRANSYNC_<SECTION>__<KEY> environment variables and --set\n\
                  options override the files. Use --no-default-inis to only\n\
                  use --ini."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the configuration files used.
    Inis,

    /// Registers, clones and scans the configured components.
    Setup(SelectArgs),

    /// Lists registered components.
    List(ListArgs),

    /// Shows repository state, pending changes and alerts.
    Status(StatusArgs),

    /// Fetches and merges upstream changes.
    Update(UpdateArgs),

    /// Commits pending changes to the files.
    Commit(SelectArgs),

    /// Pushes local commits upstream.
    Push(SelectArgs),

    /// Discards local commits and pending changes.
    Reset(SelectArgs),

    /// Removes untracked files from the checkout and rescans.
    Cleanup(SelectArgs),

    /// Locks components against new edits.
    Lock(SelectArgs),

    /// Unlocks components.
    Unlock(SelectArgs),

    /// Starts the translation of a component into a new language.
    #[command(name = "add-language")]
    AddLanguage(AddLanguageArgs),

    /// Queues a translation of one unit.
    Translate(TranslateArgs),

    /// Deletes a discovered component with its translations.
    Delete(DeleteArgs),

    /// Finds components in a checkout.
    Discover(DiscoverArgs),

    /// Manages addons.
    Addon(AddonArgs),

    /// Runs the daily addons.
    Daily(DailyArgs),

    /// Runs the background worker and scheduler until interrupted.
    Worker(WorkerArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
