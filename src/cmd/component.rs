// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository commands run on selected components.
//!
//! ```text
//! select_components --> for each component (span: component=...)
//!   setup | update | commit | push | reset | cleanup | lock | unlock
//!   failure: logged, next component; error summary at the end
//! ```

use std::fmt::Write as _;
use std::str::FromStr;

use tracing::{Instrument, error, info};

use crate::cli::component::{AddLanguageArgs, DeleteArgs, StatusArgs, TranslateArgs};
use crate::cmd::{find_component, select_components};
use crate::db::pending::PendingEdit;
use crate::error::{Result, SyncResult};
use crate::logging::LogContext;
use crate::models::{Component, UnitState};
use crate::sync::{ComponentStatus, PushOutcome, Synchronizer, UpdateOutcome};

/// Operation applied to each selected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryAction {
    Setup,
    Update { force: bool },
    Commit,
    Push,
    Reset,
    Cleanup,
    Lock(bool),
}

impl RepositoryAction {
    const fn label(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Update { .. } => "update",
            Self::Commit => "commit",
            Self::Push => "push",
            Self::Reset => "reset",
            Self::Cleanup => "cleanup",
            Self::Lock(true) => "lock",
            Self::Lock(false) => "unlock",
        }
    }

    async fn apply(self, sync: &Synchronizer, component: &Component) -> SyncResult<String> {
        let id = component.id;
        Ok(match self {
            Self::Setup => {
                let report = sync.setup_component(id).await?;
                format!(
                    "{} parsed, {} unchanged, {} new, {} removed, {} errors",
                    report.parsed, report.skipped, report.created, report.removed, report.errors
                )
            }
            Self::Update { force } => match sync.update(id, force).await? {
                UpdateOutcome::UpToDate => "up to date".to_string(),
                UpdateOutcome::Updated { previous, revision } => {
                    format!("updated {} -> {}", short(&previous), short(&revision))
                }
            },
            Self::Commit => {
                let report = sync.commit_pending(id).await?;
                let mut line = format!(
                    "{} translations, {} changes committed",
                    report.translations, report.changes
                );
                if report.skipped > 0 {
                    let _ = write!(line, ", {} skipped", report.skipped);
                }
                if report.pushed {
                    line.push_str(", pushed");
                }
                line
            }
            Self::Push => match sync.push(id).await? {
                PushOutcome::Pushed => "pushed".to_string(),
                PushOutcome::UpToDate => "nothing to push".to_string(),
                PushOutcome::NotConfigured => "no push URL configured".to_string(),
            },
            Self::Reset => {
                let report = sync.reset(id).await?;
                format!("reset, {} files parsed", report.parsed)
            }
            Self::Cleanup => {
                let report = sync.cleanup(id).await?;
                format!("cleaned, {} files parsed", report.parsed)
            }
            Self::Lock(locked) => {
                let component = sync.set_locked(id, locked).await?;
                if component.locked { "locked" } else { "unlocked" }.to_string()
            }
        })
    }
}

fn short(revision: &str) -> &str {
    revision.get(..12).unwrap_or(revision)
}

/// Applies `action` to every selected component.
///
/// # Errors
///
/// Returns an error for an invalid selection, or after all components ran
/// when at least one of them failed.
pub async fn run_repository_command(
    sync: &Synchronizer,
    specs: &[String],
    action: RepositoryAction,
) -> Result<()> {
    let components = select_components(sync, specs).await?;
    let mut failed = 0;

    for component in &components {
        let slug = component.full_slug();
        let context = LogContext::for_component(&slug);
        match action.apply(sync, component).instrument(context.span()).await {
            Ok(summary) => println!("{}{summary}", context.prefix()),
            Err(e) => {
                error!(component = %slug, action = action.label(), error = %e, "command failed");
                eprintln!("{}{e}", context.prefix());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!(
            "{} failed for {failed} of {} components",
            action.label(),
            components.len()
        );
    }
    Ok(())
}

fn describe_status(status: &ComponentStatus) -> String {
    let mut text = format!("{}\n", status.component);
    let _ = writeln!(text, "  checkout:     {}", status.checkout);
    let _ = writeln!(text, "  revision:     {}", short(&status.revision));
    let _ = writeln!(text, "  translations: {}", status.translations);
    let _ = writeln!(text, "  pending:      {}", status.pending);

    let mut flags = Vec::new();
    if status.locked {
        flags.push("locked");
    }
    if status.needs_commit {
        flags.push("needs commit");
    }
    if status.needs_merge {
        flags.push("needs merge");
    }
    if status.needs_push {
        flags.push("needs push");
    }
    if !flags.is_empty() {
        let _ = writeln!(text, "  state:        {}", flags.join(", "));
    }
    if !status.addons.is_empty() {
        let _ = writeln!(text, "  addons:       {}", status.addons.join(", "));
    }
    for alert in &status.alerts {
        if alert.subject.is_empty() {
            let _ = writeln!(text, "  alert:        {} (x{})", alert.kind, alert.occurrences);
        } else {
            let _ = writeln!(text, "  alert:        {} {} (x{})", alert.kind, alert.subject, alert.occurrences);
        }
    }
    text
}

/// Prints the status of the selected components.
///
/// # Errors
///
/// Returns selection, VCS and store errors.
pub async fn run_status_command(args: &StatusArgs, sync: &Synchronizer) -> Result<()> {
    let components = select_components(sync, &args.select.components).await?;
    let mut statuses = Vec::with_capacity(components.len());
    for component in &components {
        statuses.push(sync.status(component.id).await?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        for status in &statuses {
            print!("{}", describe_status(status));
        }
    }
    Ok(())
}

/// Starts a new translation of a component.
///
/// # Errors
///
/// Returns an error for an unknown component, a rejected language or a
/// failed commit.
pub async fn run_add_language_command(args: &AddLanguageArgs, sync: &Synchronizer) -> Result<()> {
    let component = find_component(sync, &args.component).await?;
    let span = LogContext::for_component(component.full_slug())
        .with_language(&args.language)
        .span();
    let translation = sync
        .add_new_language(component.id, &args.language, &args.author)
        .instrument(span)
        .await?;
    info!(file = %translation.filename, "translation added");
    println!(
        "{}: added {} as {}",
        component.full_slug(),
        translation.language_code,
        translation.filename
    );
    Ok(())
}

/// Queues a translation edit; it reaches the checkout with the next commit.
///
/// # Errors
///
/// Returns an error for an unknown state, a stale or read-only unit, or a
/// locked component.
pub async fn run_translate_command(args: &TranslateArgs, sync: &Synchronizer) -> Result<()> {
    let state = UnitState::from_str(&args.state)?;
    let edit = PendingEdit::builder()
        .author(args.author.as_str())
        .target(args.target.as_str())
        .state(state)
        .explanation(args.explanation.as_str())
        .add_unit(args.add_unit)
        .build();
    let unit = sync.translate(args.unit, &args.expected, &edit).await?;
    println!("unit {}: {} [{}]", unit.id, unit.target, unit.state);
    Ok(())
}

/// Deletes a component that is not declared in the configuration.
///
/// # Errors
///
/// Returns an error for an unknown or declared component, or when the
/// checkout cannot be locked or removed.
pub async fn run_delete_command(args: &DeleteArgs, sync: &Synchronizer) -> Result<()> {
    let component = find_component(sync, &args.component).await?;
    let slug = component.full_slug();
    if sync
        .config()
        .declared_components()
        .any(|(project, name)| format!("{project}/{name}") == slug)
    {
        anyhow::bail!("{slug} is declared in the configuration; remove it there instead");
    }
    sync.delete_component(component.id).await?;
    println!("{slug}: deleted");
    Ok(())
}
