// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Writing pending changes to the checkout, committing and pushing.

use chrono::{Duration as TimeDelta, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, warn};

use super::{ComponentHandle, Synchronizer, language::header_update};
use crate::addons::{ActiveAddons, Event};
use crate::db::{self, changes::NewChange};
use crate::error::SyncResult;
use crate::formats::{self, TranslationUnit, language};
use crate::models::{AlertKind, ChangeAction, CommitPolicy, PendingUnitChange, Translation, UnitState};
use crate::utility::template::render;
use crate::vcs::{RepositoryLockGuard, format_author};

/// Counts of one commit run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    /// Translations written and committed.
    pub translations: usize,
    /// Pending changes consumed.
    pub changes: usize,
    /// Translations left alone because of a parse error.
    pub skipped: usize,
    pub pushed: bool,
}

impl CommitReport {
    fn merge(&mut self, other: Self) {
        self.translations += other.translations;
        self.changes += other.changes;
        self.skipped += other.skipped;
        self.pushed |= other.pushed;
    }
}

/// Result of [`Synchronizer::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushOutcome {
    Pushed,
    /// Nothing local was missing upstream.
    UpToDate,
    /// The component has no push URL.
    NotConfigured,
}

/// Latest change per unit, oldest unit first.
fn latest_per_unit(mut changes: Vec<PendingUnitChange>) -> Vec<PendingUnitChange> {
    changes.sort_by(|a, b| (a.unit_id, a.timestamp, a.id).cmp(&(b.unit_id, b.timestamp, b.id)));
    let mut latest: BTreeMap<i64, PendingUnitChange> = BTreeMap::new();
    for change in changes {
        latest.insert(change.unit_id, change);
    }
    latest.into_values().collect()
}

/// Commit author and co-authors, from the most recent change.
fn authors(changes: &[PendingUnitChange]) -> (String, Vec<String>) {
    let mut ordered: Vec<&PendingUnitChange> = changes.iter().collect();
    ordered.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
    let mut seen = BTreeSet::new();
    let mut names = ordered
        .into_iter()
        .map(|change| change.author.trim())
        .filter(|author| !author.is_empty() && seen.insert(author.to_string()))
        .map(str::to_string);
    let author = names.next().unwrap_or_default();
    (author, names.collect())
}

impl Synchronizer {
    /// Writes and commits the pending changes of a component.
    ///
    /// Components sharing a checkout are committed together; the result is
    /// pushed when the component pushes on commit.
    ///
    /// # Errors
    ///
    /// Returns lock, file, VCS and store errors. Pending changes of a
    /// translation whose commit failed stay queued.
    pub async fn commit_pending(&self, component_id: i64) -> SyncResult<CommitReport> {
        let opened = self.open_id(component_id).await?;
        let handle = if opened.is_linked() {
            self.open(&opened.origin).await?
        } else {
            opened
        };
        let addons = self.load_addons(&handle).await?;
        let guard = handle.acquire(self.lock_timeout()).await?;
        self.commit_all_locked(&handle, &guard, &addons, false).await
    }

    /// Commits a component and its linked children under the held lock.
    pub(super) async fn commit_all_locked(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
        addons: &ActiveAddons,
        skip_push: bool,
    ) -> SyncResult<CommitReport> {
        let mut report = self.commit_locked(handle, guard, addons).await?;
        for child in self.open_children(&handle.component).await? {
            let child_addons = self.load_addons(&child).await?;
            report.merge(self.commit_locked(&child, guard, &child_addons).await?);
        }

        let origin = &handle.origin;
        if !skip_push && report.translations > 0 && origin.settings.push_on_commit && origin.can_push() {
            match self.push_locked(handle, guard, addons).await {
                Ok(outcome) => report.pushed = outcome == PushOutcome::Pushed,
                Err(e) => warn!(component = %origin.full_slug(), error = %e, "push after commit failed"),
            }
        }
        Ok(report)
    }

    /// Commits every translation of one component with eligible changes.
    async fn commit_locked(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
        addons: &ActiveAddons,
    ) -> SyncResult<CommitReport> {
        let component = &handle.component;
        let policy = handle.project.commit_policy;
        let mut report = CommitReport::default();

        for translation_id in db::pending::translations_with_pending(&self.pool, component.id, policy).await? {
            let translation = db::translations::get(&self.pool, translation_id).await?;
            if db::alerts::exists(&self.pool, component.id, Some(translation.id), AlertKind::ParseError).await? {
                warn!(file = %translation.filename, "translation has a parse error, not committing");
                report.skipped += 1;
                continue;
            }
            if let Some(changes) = self
                .commit_translation(handle, guard, addons, &translation, policy)
                .await?
            {
                report.translations += 1;
                report.changes += changes;
            }
        }

        if report.translations > 0 {
            self.fire(handle, guard, addons, Event::PostCommit).await?;
            info!(
                component = %component.full_slug(),
                translations = report.translations,
                changes = report.changes,
                "pending changes committed"
            );
        }
        Ok(report)
    }

    /// Writes the eligible changes of one translation and commits the file.
    ///
    /// The changes are taken inside a transaction that is only committed
    /// after the VCS commit succeeded. Returns the number of consumed
    /// changes, `None` when there were none.
    async fn commit_translation(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
        addons: &ActiveAddons,
        translation: &Translation,
        policy: CommitPolicy,
    ) -> SyncResult<Option<usize>> {
        let mut tx = self.pool.begin().await?;
        let taken = db::pending::take_for_translation(&mut *tx, translation.id, policy).await?;
        if taken.is_empty() {
            return Ok(None);
        }
        let consumed = taken.len();
        let (author, co_authors) = authors(&taken);
        let timestamp = taken.iter().map(|c| c.timestamp).max().unwrap_or_else(Utc::now);

        let format = handle.format.as_ref();
        let monolingual = handle.monolingual();
        let path = handle.path(&translation.filename);
        let mut store = formats::load(format, &path)?.store;

        for change in latest_per_unit(taken) {
            let unit = db::units::get(&self.pool, change.unit_id).await?;
            if unit.state == UnitState::ReadOnly {
                continue;
            }
            let source = if monolingual { "" } else { unit.source.as_str() };
            let target = match store.find_unit(&unit.context, source) {
                Some(index) => &mut store.units[index],
                None if change.add_unit || monolingual => {
                    let added = if monolingual {
                        TranslationUnit::keyed(unit.context.clone(), "")
                    } else {
                        TranslationUnit {
                            context: unit.context.clone(),
                            source: unit.source.clone(),
                            ..TranslationUnit::default()
                        }
                    };
                    let index = store.add_unit(added);
                    &mut store.units[index]
                }
                None => {
                    warn!(file = %translation.filename, unit = unit.id, "unit no longer in the file, change dropped");
                    continue;
                }
            };
            if target.read_only {
                continue;
            }
            target.set_target(&change.target, change.state);
            if !change.explanation.is_empty() {
                target.explanation.clone_from(&change.explanation);
            }
        }

        let update = header_update(handle, &translation.language_code, Some(author.clone()), Some(timestamp));
        format.update_header(&mut store, &update);
        let revision = formats::save(format, &path, &store)?;
        db::units::clear_pending(&mut *tx, translation.id).await?;

        let ctx = self.context(handle, guard);
        let pre_commit = addons
            .run(
                &ctx,
                Event::PreCommit {
                    translation,
                    author: &author,
                },
            )
            .await;
        let mut files = vec![translation.filename.clone()];
        for changed in ctx.take_changed() {
            if !files.contains(&changed) {
                files.push(changed);
            }
        }

        let message = self
            .commit_message(handle, translation, &author, &co_authors)
            .await?;
        let committed = match handle
            .repository
            .commit(guard, &message, &author, timestamp, &files)
            .await
        {
            Ok(committed) => committed,
            Err(e) => {
                error!(file = %translation.filename, error = %e, "commit failed, changes stay pending");
                drop(tx);
                pre_commit.settle(&self.pool, &handle.component).await;
                return Err(e);
            }
        };
        tx.commit().await?;
        pre_commit.settle(&self.pool, &handle.component).await;

        db::translations::update_revision(&self.pool, translation.id, &revision, translation.plural_count).await?;
        db::changes::record(
            &self.pool,
            &NewChange::component(ChangeAction::Commit, handle.component.id)
                .with_translation(translation.id)
                .with_author(author)
                .with_details(json!({
                    "changes": consumed,
                    "files": files,
                    "revision": handle.repository.last_revision().await.unwrap_or_default(),
                })),
        )
        .await?;
        if !committed {
            debug!(file = %translation.filename, "file already matched the pending changes");
        }
        Ok(Some(consumed))
    }

    /// Renders the commit message of a translation.
    async fn commit_message(
        &self,
        handle: &ComponentHandle,
        translation: &Translation,
        author: &str,
        co_authors: &[String],
    ) -> SyncResult<String> {
        let stats = db::units::stats(&self.pool, translation.id).await?;
        let mut context = handle.template_context();
        context.insert("language_code".to_string(), json!(translation.language_code));
        context.insert(
            "language_name".to_string(),
            json!(language::language_name(&translation.language_code)),
        );
        context.insert("author".to_string(), json!(author));
        context.insert(
            "stats".to_string(),
            json!({
                "all": stats.all,
                "translated": stats.translated,
                "translated_percent": stats.translated_percent(),
            }),
        );
        let mut message = render(&handle.component.settings.commit_message, &Value::Object(context));
        if !co_authors.is_empty() {
            message.push_str("\n\n");
            let trailers: Vec<String> = co_authors
                .iter()
                .map(|co_author| format!("Co-authored-by: {}", format_author(co_author, &self.vcs.committer_email)))
                .collect();
            message.push_str(&trailers.join("\n"));
        }
        Ok(message)
    }

    /// Commits the components whose oldest pending change is older than
    /// their `commit_pending_age`; returns the number of translations
    /// committed.
    ///
    /// A failing component is logged and the sweep goes on.
    ///
    /// # Errors
    ///
    /// Returns a store error if the components cannot be listed.
    pub async fn commit_sweep(&self) -> SyncResult<usize> {
        let now = Utc::now();
        let mut origins = BTreeSet::new();
        for component in db::components::list(&self.pool).await? {
            let cutoff = now - TimeDelta::hours(component.settings.commit_pending_age);
            if db::pending::older_than(&self.pool, component.id, cutoff).await?.is_empty() {
                continue;
            }
            match self.origin_of(&component).await {
                Ok(origin) => {
                    origins.insert(origin.id);
                }
                Err(e) => warn!(component = %component.full_slug(), error = %e, "cannot resolve component link"),
            }
        }

        let mut committed = 0;
        for component_id in origins {
            match self.commit_pending(component_id).await {
                Ok(report) => committed += report.translations,
                Err(e) => error!(component = component_id, error = %e, "scheduled commit failed"),
            }
        }
        info!(translations = committed, "commit sweep done");
        Ok(committed)
    }

    /// Publishes local commits of a component.
    ///
    /// # Errors
    ///
    /// Returns lock, merge and push errors; failures are also recorded as
    /// alerts.
    pub async fn push(&self, component_id: i64) -> SyncResult<PushOutcome> {
        let opened = self.open_id(component_id).await?;
        let handle = if opened.is_linked() {
            self.open(&opened.origin).await?
        } else {
            opened
        };
        let addons = self.load_addons(&handle).await?;
        let guard = handle.acquire(self.lock_timeout()).await?;
        self.push_locked(&handle, &guard, &addons).await
    }

    /// Fetches, merges if the remote moved, and pushes.
    pub(super) async fn push_locked(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
        addons: &ActiveAddons,
    ) -> SyncResult<PushOutcome> {
        let origin = &handle.origin;
        if !origin.can_push() {
            return Ok(PushOutcome::NotConfigured);
        }
        self.fetch(handle, guard).await?;
        if handle.repository.needs_merge().await? {
            self.merge_remote(handle, guard).await?;
            self.scan_with_children(handle, guard, addons, false).await?;
        }
        if !handle.repository.needs_push().await? {
            debug!(component = %origin.full_slug(), "nothing to push");
            return Ok(PushOutcome::UpToDate);
        }

        self.fire(handle, guard, addons, Event::PrePush).await?;
        let branch = origin.push_branch();
        if let Err(error) = handle.repository.push(guard, branch).await {
            let status = handle.repository.status().await.unwrap_or_default();
            self.record_vcs_failure(origin, ChangeAction::FailedPush, AlertKind::PushFailure, &error, &status)
                .await?;
            return Err(error);
        }
        self.clear_alerts(origin, &[AlertKind::PushFailure]).await?;
        db::changes::record(
            &self.pool,
            &NewChange::component(ChangeAction::Push, origin.id).with_details(json!({ "branch": branch })),
        )
        .await?;
        info!(component = %origin.full_slug(), branch, "pushed");
        self.fire_with_children(handle, guard, addons, Event::PostPush).await?;
        Ok(PushOutcome::Pushed)
    }
}

#[cfg(test)]
mod tests;
