// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Background worker arguments.

use clap::Args;

/// Arguments for the `worker` command.
#[derive(Debug, Clone, Default, Args)]
pub struct WorkerArgs {
    /// Overrides `jobs.workers`.
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Runs the startup jobs without the hourly scheduler, then exits.
    #[arg(long)]
    pub no_scheduler: bool,

    /// Skips cloning and scanning the configured components on start.
    #[arg(long)]
    pub no_setup: bool,
}

/// Arguments for the `daily` command.
#[derive(Debug, Clone, Default, Args)]
pub struct DailyArgs {
    /// Only runs the components sharded to this hour (0-23); all hours
    /// when omitted.
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
    pub hour: Option<u32>,

    /// Also trims the audit log to `jobs.changes_retention_days`.
    #[arg(long)]
    pub cleanup_changes: bool,

    /// Also commits changes older than each component's `commit_pending_age`.
    #[arg(long)]
    pub commit_sweep: bool,
}
