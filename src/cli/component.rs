// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the component commands.
//!
//! ```text
//! COMPONENT   project/slug, a glob ('demo/*') or an alias from [aliases]
//!             none given: every configured component
//! ```

use clap::Args;

/// Component selection shared by the repository commands.
#[derive(Debug, Clone, Default, Args)]
pub struct SelectArgs {
    /// Components to operate on; globs and aliases are supported.
    #[arg(value_name = "COMPONENT")]
    pub components: Vec<String>,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Lists aliases instead of components.
    #[arg(short, long)]
    pub aliases: bool,

    /// Only lists the components matching these patterns.
    #[arg(value_name = "COMPONENT")]
    pub components: Vec<String>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Prints JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `update` command.
#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Merges and rescans even when the remote did not move.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `add-language` command.
#[derive(Debug, Clone, Args)]
pub struct AddLanguageArgs {
    /// Component, as `project/slug`.
    #[arg(value_name = "COMPONENT")]
    pub component: String,

    /// Language code, such as `de` or `pt_BR`.
    #[arg(value_name = "LANGUAGE")]
    pub language: String,

    /// Author of the commit, `Name <email>`.
    #[arg(short, long, default_value = "Transync <noreply@transync.invalid>")]
    pub author: String,
}

/// Arguments for the `translate` command.
#[derive(Debug, Clone, Args)]
pub struct TranslateArgs {
    /// Unit id, as shown by `status --json` or the database.
    #[arg(value_name = "UNIT")]
    pub unit: i64,

    /// New translation.
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Translation the edit is based on; the edit is refused if the unit
    /// changed meanwhile.
    #[arg(short, long, value_name = "TEXT", default_value = "")]
    pub expected: String,

    /// Author of the change, `Name <email>`.
    #[arg(short, long)]
    pub author: String,

    /// State of the new translation.
    #[arg(long, default_value = "translated")]
    pub state: String,

    /// Explanation attached to the unit.
    #[arg(long, default_value = "")]
    pub explanation: String,

    /// Adds the unit to the file if the format supports it.
    #[arg(long)]
    pub add_unit: bool,
}

/// Arguments for the `discover` command.
#[derive(Debug, Clone, Args)]
pub struct DiscoverArgs {
    /// Component whose checkout is searched, as `project/slug`.
    #[arg(value_name = "COMPONENT")]
    pub component: String,

    /// Regex with `language` and optional `component` groups, matched
    /// against paths relative to the checkout.
    #[arg(short = 'm', long = "match", value_name = "REGEX")]
    pub match_regex: String,

    /// Template of the component name.
    #[arg(long, default_value = "{{ component }}")]
    pub name_template: String,

    /// Template of the monolingual base file.
    #[arg(long, default_value = "")]
    pub base_file_template: String,

    /// Template of the base file for new translations.
    #[arg(long, default_value = "")]
    pub new_base_template: String,

    /// File format of the discovered components.
    #[arg(short, long, default_value = "po")]
    pub file_format: String,

    /// Languages to include.
    #[arg(long, default_value = "^[^.]+$")]
    pub language_regex: String,

    /// Deletes linked components whose files are gone when the addon runs.
    #[arg(long, requires = "install")]
    pub remove: bool,

    /// Installs the discovery addon with these settings instead of only
    /// printing what it would create.
    #[arg(long)]
    pub install: bool,
}

/// Arguments for the `delete` command.
#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// Component to delete, as `project/slug`.
    #[arg(value_name = "COMPONENT")]
    pub component: String,
}
