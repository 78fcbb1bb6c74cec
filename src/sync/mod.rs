// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Component Synchronizer.
//!
//! ```text
//! update        lock --> fetch --> (nothing new? stop) --> commit pending
//!               --> PRE_UPDATE --> merge | rebase | merge --no-ff
//!                      conflict: abort, merge-failure alert, audit row
//!               --> rescan --> POST_UPDATE (component + linked children)
//!               --> rescan again if addons moved the revision
//!
//! commit        per translation with eligible changes, no parse-error alert:
//!               tx { take rows --> write file --> PRE_COMMIT --> vcs commit }
//!               --> POST_COMMIT --> linked children --> push if configured
//!
//! push          fetch --> merge if diverged --> PRE_PUSH --> push
//!                      failure: push-failure alert, audit row
//!               --> POST_PUSH (component + linked children)
//!
//! add-language  validate --> write untranslated file --> translation row
//!               --> commit --> POST_ADD
//!
//! rescan        mask matches --> duplicate languages alert
//!               --> parse changed files (parse-error alert blocks commits)
//!               --> reconcile units --> drop vanished translations
//!               --> COMPONENT_UPDATE
//! ```
//!
//! Every step touching the checkout runs under its [`RepositoryLock`];
//! linked components share the lock of the component owning the checkout.
//! Repository alerts count occurrences and lock the component once the
//! configured threshold is reached.
//!
//! [`RepositoryLock`]: crate::vcs::RepositoryLock

mod commit;
mod handle;
mod language;
mod scan;
mod translate;
mod update;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests;

use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use commit::{CommitReport, PushOutcome};
pub use handle::ComponentHandle;
pub use scan::ScanReport;
pub use update::UpdateOutcome;

use crate::addons::{ActiveAddons, AddonContext, AddonRegistry, Event};
use crate::config::Config;
use crate::config::types::VcsConfig;
use crate::db::{self, DbPool};
use crate::error::{SyncResult, ValidationError};
use crate::formats::registry;
use crate::models::{
    AddonEvent, Alert, AlertKind, ChangeAction, Component, Project, parse_link,
};
use crate::vcs::{RepositoryLock, RepositoryLockGuard, open_repository};

/// Drives components through their lifecycle.
///
/// Cheap to clone; workers share one instance.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    pool: DbPool,
    config: Arc<Config>,
    vcs: Arc<VcsConfig>,
    addons: Arc<AddonRegistry>,
}

/// Snapshot of a component for `status`.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    pub component: String,
    pub checkout: String,
    pub locked: bool,
    pub revision: String,
    pub remote_revision: String,
    pub needs_commit: bool,
    pub needs_merge: bool,
    pub needs_push: bool,
    pub pending: i64,
    pub translations: usize,
    pub alerts: Vec<Alert>,
    pub addons: Vec<String>,
}

impl Synchronizer {
    #[must_use]
    pub fn new(pool: DbPool, config: Arc<Config>, addons: Arc<AddonRegistry>) -> Self {
        let vcs = Arc::new(config.vcs.clone());
        Self {
            pool,
            config,
            vcs,
            addons,
        }
    }

    #[must_use]
    pub const fn pool(&self) -> &DbPool {
        &self.pool
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn addon_registry(&self) -> &AddonRegistry {
        &self.addons
    }

    fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.vcs.lock_timeout)
    }

    /// Component owning the checkout of `component`.
    async fn origin_of(&self, component: &Component) -> SyncResult<Component> {
        let Some((project, slug)) = component.linked_to() else {
            return Ok(component.clone());
        };
        let origin = db::components::find(&self.pool, project, slug)
            .await?
            .ok_or_else(|| ValidationError::InvalidLink(component.settings.repo.clone()))?;
        if origin.is_linked() || origin.id == component.id {
            return Err(ValidationError::InvalidLink(component.settings.repo.clone()).into());
        }
        Ok(origin)
    }

    /// Binds a component to its checkout.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidLink` for a link to a missing or
    /// itself linked component, `FormatError::UnknownFormat`, or a store error.
    pub async fn open(&self, component: &Component) -> SyncResult<ComponentHandle> {
        let project = db::projects::get(&self.pool, component.project_id).await?;
        let origin = self.origin_of(component).await?;
        let checkout = self.config.paths.checkout(&origin.project_slug, &origin.slug);
        let repository = open_repository(
            origin.settings.vcs,
            &checkout,
            &origin.settings.branch,
            Arc::clone(&self.vcs),
        );
        let format = registry().get(&component.settings.file_format)?;
        Ok(ComponentHandle {
            project,
            component: component.clone(),
            origin,
            lock: RepositoryLock::new(&checkout),
            checkout,
            repository,
            format,
        })
    }

    /// Loads a component by id and binds it.
    ///
    /// # Errors
    ///
    /// See [`Synchronizer::open`].
    pub async fn open_id(&self, component_id: i64) -> SyncResult<ComponentHandle> {
        let component = db::components::get(&self.pool, component_id).await?;
        self.open(&component).await
    }

    /// Handles of the components sharing the checkout of `origin`.
    async fn open_children(&self, origin: &Component) -> SyncResult<Vec<ComponentHandle>> {
        let mut handles = Vec::new();
        for child in db::components::linked_children(&self.pool, origin).await? {
            handles.push(self.open(&child).await?);
        }
        Ok(handles)
    }

    async fn load_addons(&self, handle: &ComponentHandle) -> SyncResult<ActiveAddons> {
        ActiveAddons::load(&self.pool, &self.addons, &handle.component, handle.monolingual()).await
    }

    fn context<'a>(&'a self, handle: &'a ComponentHandle, guard: &'a RepositoryLockGuard) -> AddonContext<'a> {
        AddonContext::new(&self.pool, handle, guard, &self.vcs)
    }

    /// Dispatches `event` on one component, then scans the components the
    /// addons asked for.
    async fn fire(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
        addons: &ActiveAddons,
        event: Event<'_>,
    ) -> SyncResult<usize> {
        if !addons.handles(event.kind()) {
            return Ok(0);
        }
        let ctx = self.context(handle, guard);
        let failures = addons.dispatch(&ctx, event).await;
        for component_id in ctx.take_scan_requests() {
            let requested = self.open_id(component_id).await?;
            if !requested.guarded_by(guard) {
                warn!(component = %requested.component.full_slug(), "requested scan of another checkout skipped");
                continue;
            }
            let requested_addons = self.load_addons(&requested).await?;
            self.scan_locked(&requested, guard, &requested_addons, false).await?;
        }
        Ok(failures)
    }

    /// Dispatches `event` on the component and every linked child.
    async fn fire_with_children(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
        addons: &ActiveAddons,
        event: Event<'_>,
    ) -> SyncResult<()> {
        self.fire(handle, guard, addons, event).await?;
        for child in self.open_children(&handle.component).await? {
            let child_addons = self.load_addons(&child).await?;
            self.fire(&child, guard, &child_addons, event).await?;
        }
        Ok(())
    }

    /// Raises an alert; repository alerts may lock the component.
    async fn raise_alert(
        &self,
        component: &Component,
        translation_id: Option<i64>,
        kind: AlertKind,
        details: Value,
    ) -> SyncResult<Alert> {
        let alert = db::alerts::raise(&self.pool, component.id, translation_id, kind, &details).await?;
        warn!(component = %component.full_slug(), alert = %kind, occurrences = alert.occurrences, "alert raised");
        if kind.is_repository()
            && component.settings.auto_lock_error
            && alert.occurrences >= self.vcs.auto_lock_threshold
        {
            self.auto_lock(component, kind).await?;
        }
        Ok(alert)
    }

    async fn auto_lock(&self, component: &Component, reason: AlertKind) -> SyncResult<()> {
        let current = db::components::get(&self.pool, component.id).await?;
        if current.locked {
            return Ok(());
        }
        let mut affected = vec![current];
        affected.extend(db::components::linked_children(&self.pool, component).await?);
        for target in affected.iter().filter(|c| !c.locked) {
            db::components::set_locked(&self.pool, target.id, true).await?;
            db::changes::record(
                &self.pool,
                &db::changes::NewChange::component(ChangeAction::ComponentLocked, target.id)
                    .with_details(json!({ "reason": reason.as_str(), "automatic": true })),
            )
            .await?;
            warn!(component = %target.full_slug(), reason = %reason, "component locked after repeated errors");
        }
        Ok(())
    }

    async fn clear_alerts(&self, component: &Component, kinds: &[AlertKind]) -> SyncResult<()> {
        for &kind in kinds {
            db::alerts::clear(&self.pool, component.id, None, kind).await?;
        }
        Ok(())
    }

    /// Locks or unlocks a component against new edits.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn set_locked(&self, component_id: i64, locked: bool) -> SyncResult<Component> {
        db::components::set_locked(&self.pool, component_id, locked).await?;
        let action = if locked {
            ChangeAction::ComponentLocked
        } else {
            ChangeAction::ComponentUnlocked
        };
        db::changes::record(&self.pool, &db::changes::NewChange::component(action, component_id)).await?;
        let component = db::components::get(&self.pool, component_id).await?;
        info!(component = %component.full_slug(), locked, "component lock changed");
        Ok(component)
    }

    /// Creates or refreshes the projects and components declared in the
    /// configuration; returns the components in declaration order, owners of
    /// a checkout before the components linked to them.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidLink` for a link to an undeclared
    /// component, or a store error.
    pub async fn register_from_config(&self) -> SyncResult<Vec<Component>> {
        let mut projects: Vec<Project> = Vec::new();
        for (slug, settings) in &self.config.projects {
            let name = if settings.name.is_empty() { slug } else { &settings.name };
            projects.push(db::projects::upsert(&self.pool, slug, name, settings.commit_policy).await?);
        }

        let mut declared: Vec<(&str, &str)> = self.config.declared_components().collect();
        declared.sort_by_key(|(project, slug)| {
            let settings = self.config.component_config(&format!("{project}/{slug}"));
            parse_link(&settings.repo).is_some()
        });

        let mut components = Vec::new();
        for (project_slug, slug) in declared {
            let full_slug = format!("{project_slug}/{slug}");
            let mut settings = self.config.component_config(&full_slug);
            if settings.name.is_empty() {
                settings.name = slug.to_string();
            }
            if let Some((link_project, link_slug)) = parse_link(&settings.repo)
                && !self.config.components.contains_key(&format!("{link_project}/{link_slug}"))
                && db::components::find(&self.pool, link_project, link_slug).await?.is_none()
            {
                return Err(ValidationError::InvalidLink(settings.repo.clone()).into());
            }
            let Some(project) = projects.iter().find(|p| p.slug == project_slug) else {
                return Err(ValidationError::UnknownComponent(full_slug).into());
            };
            let component = db::components::upsert(&self.pool, project, slug, &settings).await?;
            info!(component = %component.full_slug(), "component registered");
            components.push(component);
        }
        Ok(components)
    }

    /// Clones a missing checkout and scans the component and its children.
    ///
    /// # Errors
    ///
    /// Returns lock, VCS, parse and store errors.
    pub async fn setup_component(&self, component_id: i64) -> SyncResult<ScanReport> {
        let handle = self.open_id(component_id).await?;
        let addons = self.load_addons(&handle).await?;
        let guard = handle.acquire(self.lock_timeout()).await?;
        if !handle.is_linked() {
            self.ensure_checkout(&handle, &guard).await?;
        }
        self.scan_locked(&handle, &guard, &addons, false).await
    }

    /// Removes a component with its translations, pending changes and
    /// alerts. Deleting a component owning its checkout also deletes the
    /// components linked to it and removes the checkout.
    ///
    /// # Errors
    ///
    /// Returns lock, filesystem and store errors.
    pub async fn delete_component(&self, component_id: i64) -> SyncResult<()> {
        let handle = self.open_id(component_id).await?;
        let children = db::components::linked_children(&self.pool, &handle.component).await?;
        let guard = handle.acquire(self.lock_timeout()).await?;
        for child in &children {
            db::components::delete(&self.pool, child.id).await?;
            info!(component = %child.full_slug(), "linked component deleted");
        }
        db::components::delete(&self.pool, component_id).await?;
        if !handle.is_linked() && handle.checkout.exists() {
            std::fs::remove_dir_all(&handle.checkout)
                .map_err(|e| crate::error::FsError::io(&handle.checkout, e))?;
        }
        drop(guard);
        info!(component = %handle.component.full_slug(), "component deleted");
        Ok(())
    }

    /// Repository and database state of a component.
    ///
    /// # Errors
    ///
    /// Returns VCS and store errors.
    pub async fn status(&self, component_id: i64) -> SyncResult<ComponentStatus> {
        let handle = self.open_id(component_id).await?;
        let component = &handle.component;
        let valid = handle.repository.is_valid();
        let (revision, remote_revision, needs_commit, needs_merge, needs_push) = if valid {
            (
                handle.repository.last_revision().await.unwrap_or_default(),
                handle.repository.last_remote_revision().await.unwrap_or_default(),
                handle.repository.needs_commit(&[]).await?,
                handle.repository.needs_merge().await?,
                component.can_push() && handle.repository.needs_push().await?,
            )
        } else {
            (String::new(), String::new(), false, false, false)
        };
        let addons = self.load_addons(&handle).await?;
        Ok(ComponentStatus {
            component: component.full_slug(),
            checkout: handle.checkout.display().to_string(),
            locked: component.locked,
            revision,
            remote_revision,
            needs_commit,
            needs_merge,
            needs_push,
            pending: db::pending::count_for_component(&self.pool, component.id).await?,
            translations: db::translations::list_for_component(&self.pool, component.id).await?.len(),
            alerts: db::alerts::list_for_component(&self.pool, component.id).await?,
            addons: addons.names().map(str::to_string).collect(),
        })
    }

    /// Runs the daily addons of the components whose id falls on `hour`.
    ///
    /// # Errors
    ///
    /// Returns the first lock or store error; addon failures become alerts.
    pub async fn daily(&self, hour: u32) -> SyncResult<usize> {
        let mut ran = 0;
        for component in db::components::list(&self.pool).await? {
            if component.id.rem_euclid(24) != i64::from(hour % 24) {
                continue;
            }
            let handle = self.open(&component).await?;
            let addons = self.load_addons(&handle).await?;
            if !addons.handles(AddonEvent::Daily) {
                continue;
            }
            let guard = handle.acquire(self.lock_timeout()).await?;
            self.fire(&handle, &guard, &addons, Event::Daily).await?;
            ran += 1;
        }
        info!(hour, components = ran, "daily addons done");
        Ok(ran)
    }
}
