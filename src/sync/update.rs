// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pulling from the remote: update, reset and cleanup.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::{ComponentHandle, ScanReport, Synchronizer};
use crate::addons::{ActiveAddons, Event};
use crate::db::{self, changes::NewChange};
use crate::error::{SyncError, SyncResult};
use crate::models::{AlertKind, ChangeAction, Component, MergeStyle};
use crate::utility::template::render;
use crate::vcs::{MergeMode, RepositoryLockGuard};

/// Result of [`Synchronizer::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The remote had nothing new.
    UpToDate,
    /// Upstream changes were merged.
    Updated { previous: String, revision: String },
}

/// Alert details of a failed VCS step.
fn failure_details(error: &SyncError, status: &str) -> Value {
    json!({
        "error": error.to_string(),
        "output": error.as_vcs().and_then(crate::error::VcsError::output).unwrap_or_default(),
        "status": status,
    })
}

impl Synchronizer {
    /// Records a failed VCS step as an audit row and a repository alert.
    pub(super) async fn record_vcs_failure(
        &self,
        component: &Component,
        action: ChangeAction,
        kind: AlertKind,
        error: &SyncError,
        status: &str,
    ) -> SyncResult<()> {
        let details = failure_details(error, status);
        db::changes::record(
            &self.pool,
            &NewChange::component(action, component.id).with_details(details.clone()),
        )
        .await?;
        self.raise_alert(component, None, kind, details).await?;
        Ok(())
    }

    /// Clones a missing checkout and points it at the configured remote.
    pub(super) async fn ensure_checkout(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
    ) -> SyncResult<()> {
        let settings = &handle.origin.settings;
        if !handle.repository.is_valid() {
            info!(component = %handle.origin.full_slug(), url = %settings.repo, "cloning repository");
            handle.repository.clone_from(guard, &settings.repo).await?;
        }
        handle
            .repository
            .configure_remote(guard, &settings.repo, &settings.push)
            .await
    }

    /// Fetches the remote; a failure raises an `update-failure` alert.
    pub(super) async fn fetch(&self, handle: &ComponentHandle, guard: &RepositoryLockGuard) -> SyncResult<()> {
        let origin = &handle.origin;
        if let Err(error) = handle.repository.update_remote(guard).await {
            self.record_vcs_failure(origin, ChangeAction::FailedUpdate, AlertKind::UpdateFailure, &error, "")
                .await?;
            return Err(error);
        }
        self.clear_alerts(origin, &[AlertKind::UpdateFailure]).await
    }

    /// Merges or rebases on the remote branch per the merge style.
    ///
    /// A conflict is aborted, recorded as a `merge-failure` alert with an
    /// audit row, and returned.
    pub(super) async fn merge_remote(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
    ) -> SyncResult<()> {
        let origin = &handle.origin;
        let style = origin.settings.merge_style;
        let message = render(&origin.settings.merge_message, &Value::Object(handle.template_context()));
        let result = match style {
            MergeStyle::Rebase => handle.repository.rebase(guard, false).await,
            MergeStyle::Merge => handle.repository.merge(guard, false, MergeMode::Merge, &message).await,
            MergeStyle::MergeNoFf => {
                handle
                    .repository
                    .merge(guard, false, MergeMode::MergeNoFf, &message)
                    .await
            }
        };
        let Err(error) = result else {
            self.clear_alerts(origin, &[AlertKind::MergeFailure]).await?;
            return Ok(());
        };

        let status = handle.repository.status().await.unwrap_or_default();
        let abort = match style {
            MergeStyle::Rebase => handle.repository.rebase(guard, true).await,
            _ => handle.repository.merge(guard, true, MergeMode::Merge, "").await,
        };
        if let Err(e) = abort {
            warn!(component = %origin.full_slug(), error = %e, "failed to abort merge");
        }

        let action = if style == MergeStyle::Rebase {
            ChangeAction::FailedRebase
        } else {
            ChangeAction::FailedMerge
        };
        self.record_vcs_failure(origin, action, AlertKind::MergeFailure, &error, &status)
            .await?;
        Err(error)
    }

    /// Pulls upstream changes into the checkout of a component.
    ///
    /// A linked component updates the component owning its checkout. With
    /// `force` the merge runs even when the fetch brought nothing new.
    ///
    /// # Errors
    ///
    /// Returns lock, VCS (after recording the failure) and store errors.
    pub async fn update(&self, component_id: i64, force: bool) -> SyncResult<UpdateOutcome> {
        let opened = self.open_id(component_id).await?;
        let handle = if opened.is_linked() {
            self.open(&opened.origin).await?
        } else {
            opened
        };
        let origin = &handle.origin;
        let addons = self.load_addons(&handle).await?;
        let guard = handle.acquire(self.lock_timeout()).await?;
        self.ensure_checkout(&handle, &guard).await?;

        let previous = handle.repository.last_revision().await?;
        self.fetch(&handle, &guard).await?;

        if !force && !handle.repository.needs_merge().await? {
            debug!(component = %origin.full_slug(), "repository is up to date");
            return Ok(UpdateOutcome::UpToDate);
        }

        self.commit_all_locked(&handle, &guard, &addons, true).await?;
        self.fire(&handle, &guard, &addons, Event::PreUpdate).await?;
        self.merge_remote(&handle, &guard).await?;

        let revision = handle.repository.last_revision().await?;
        db::changes::record(
            &self.pool,
            &NewChange::component(ChangeAction::Update, origin.id)
                .with_details(json!({ "previous": previous, "revision": revision })),
        )
        .await?;
        info!(component = %origin.full_slug(), %previous, %revision, "repository updated");

        self.scan_with_children(&handle, &guard, &addons, false).await?;
        self.fire_with_children(
            &handle,
            &guard,
            &addons,
            Event::PostUpdate {
                previous_revision: &previous,
                skip_push: false,
            },
        )
        .await?;

        handle.repository.invalidate_cache();
        let after_addons = handle.repository.last_revision().await?;
        if after_addons != revision {
            debug!(component = %origin.full_slug(), "addons changed the repository, rescanning");
            self.scan_with_children(&handle, &guard, &addons, false).await?;
        }
        Ok(UpdateOutcome::Updated {
            previous,
            revision: after_addons,
        })
    }

    /// Scans the component and every component linked to it.
    pub(super) async fn scan_with_children(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
        addons: &ActiveAddons,
        force: bool,
    ) -> SyncResult<ScanReport> {
        let mut report = self.scan_locked(handle, guard, addons, force).await?;
        for child in self.open_children(&handle.component).await? {
            let child_addons = self.load_addons(&child).await?;
            report.merge(self.scan_locked(&child, guard, &child_addons, force).await?);
        }
        Ok(report)
    }

    /// Discards local commits and pending changes, matching the remote.
    ///
    /// # Errors
    ///
    /// Returns lock, VCS and store errors.
    pub async fn reset(&self, component_id: i64) -> SyncResult<ScanReport> {
        let opened = self.open_id(component_id).await?;
        let handle = if opened.is_linked() {
            self.open(&opened.origin).await?
        } else {
            opened
        };
        let addons = self.load_addons(&handle).await?;
        let guard = handle.acquire(self.lock_timeout()).await?;
        self.ensure_checkout(&handle, &guard).await?;
        self.fetch(&handle, &guard).await?;
        handle.repository.reset(&guard).await?;

        let mut discarded = db::pending::discard_for_component(&self.pool, handle.component.id).await?;
        for child in db::components::linked_children(&self.pool, &handle.component).await? {
            discarded += db::pending::discard_for_component(&self.pool, child.id).await?;
        }
        self.clear_alerts(
            &handle.origin,
            &[AlertKind::MergeFailure, AlertKind::UpdateFailure, AlertKind::PushFailure],
        )
        .await?;

        let report = self.scan_with_children(&handle, &guard, &addons, true).await?;
        db::changes::record(
            &self.pool,
            &NewChange::component(ChangeAction::Reset, handle.component.id)
                .with_details(json!({ "discarded": discarded })),
        )
        .await?;
        info!(component = %handle.component.full_slug(), discarded, "repository reset");
        Ok(report)
    }

    /// Removes untracked files and interrupted merges, then rescans.
    ///
    /// # Errors
    ///
    /// Returns lock, VCS and store errors.
    pub async fn cleanup(&self, component_id: i64) -> SyncResult<ScanReport> {
        let opened = self.open_id(component_id).await?;
        let handle = if opened.is_linked() {
            self.open(&opened.origin).await?
        } else {
            opened
        };
        let addons = self.load_addons(&handle).await?;
        let guard = handle.acquire(self.lock_timeout()).await?;
        handle.repository.cleanup(&guard).await?;
        let report = self.scan_with_children(&handle, &guard, &addons, true).await?;
        db::changes::record(
            &self.pool,
            &NewChange::component(ChangeAction::Cleanup, handle.component.id),
        )
        .await?;
        info!(component = %handle.component.full_slug(), "repository cleaned up");
        Ok(report)
    }
}
