// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! A component bound to its checkout, lock, repository and format.

use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SyncResult;
use crate::formats::FileFormat;
use crate::models::{Component, Project};
use crate::vcs::{RepositoryLock, RepositoryLockGuard, VersionControl};

/// Everything needed to work on one component.
///
/// Linked components share the checkout, lock and repository of `origin`.
pub struct ComponentHandle {
    pub project: Project,
    pub component: Component,
    /// Component owning the checkout; the component itself unless linked.
    pub origin: Component,
    pub checkout: PathBuf,
    pub lock: RepositoryLock,
    pub repository: Box<dyn VersionControl>,
    pub format: Arc<dyn FileFormat>,
}

impl std::fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("component", &self.component.full_slug())
            .field("origin", &self.origin.full_slug())
            .field("checkout", &self.checkout)
            .field("vcs", &self.repository.kind())
            .field("format", &self.format.id())
            .finish()
    }
}

impl ComponentHandle {
    /// Whether units are keyed against a template.
    #[must_use]
    pub fn monolingual(&self) -> bool {
        self.format.monolingual()
    }

    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.component.id != self.origin.id
    }

    /// Absolute path of a checkout-relative file.
    #[must_use]
    pub fn path(&self, filename: &str) -> PathBuf {
        self.checkout.join(filename)
    }

    /// Configured file relative to the checkout, if set.
    #[must_use]
    pub fn optional_path(&self, filename: &str) -> Option<PathBuf> {
        (!filename.is_empty()).then(|| self.path(filename))
    }

    /// Template of a monolingual component.
    #[must_use]
    pub fn template_path(&self) -> Option<PathBuf> {
        self.optional_path(&self.component.settings.template)
    }

    /// File new translations are seeded from.
    #[must_use]
    pub fn new_base_path(&self) -> Option<PathBuf> {
        if self.monolingual() && self.component.has_template() {
            return self.template_path();
        }
        self.optional_path(&self.component.settings.new_base)
    }

    /// Waits for the checkout lock.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Timeout` once `timeout` passes.
    pub async fn acquire(&self, timeout: Duration) -> SyncResult<RepositoryLockGuard> {
        Ok(self.lock.acquire(timeout).await?)
    }

    /// Whether `guard` protects this checkout.
    #[must_use]
    pub fn guarded_by(&self, guard: &RepositoryLockGuard) -> bool {
        guard.covers(&self.checkout)
    }

    /// Variables shared by every message template.
    #[must_use]
    pub fn template_context(&self) -> Map<String, Value> {
        let settings = &self.origin.settings;
        let remote_branch = match self.repository.as_git() {
            Some(git) => git.remote_branch_name(),
            None => settings.branch.clone(),
        };
        let context = json!({
            "project_name": self.project.name,
            "project_slug": self.project.slug,
            "component_name": self.component.name,
            "component_slug": self.component.slug,
            "component_remote_branch": remote_branch,
            "url": settings.repo,
            "branch": settings.branch,
            "vcs": settings.vcs.as_str(),
        });
        match context {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}
