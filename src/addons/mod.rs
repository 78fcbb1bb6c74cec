// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Addons: behavior bound to component lifecycle events.
//!
//! ```text
//! AddonRegistry (name -> metadata + factory)     built once, injected
//!        |
//!        | create(name, json config)   validates the configuration
//!        v
//! ActiveAddons::load(component)   component + project + site scoped rows,
//!        |                        install order, incompatible ones skipped
//!        v
//! dispatch(ctx, Event::PreCommit { .. })
//!   addon A --> handle() --> pre_commit()   ok
//!   addon B --> handle() --> pre_commit()   Err --> addon-error alert
//!   addon C --> ...                         (B does not stop C)
//! ```
//!
//! Handlers run while the synchronizer holds the checkout lock; the context
//! carries the guard so an addon can commit what it changed.

pub mod builtin;
mod dispatch;
mod registry;

#[cfg(test)]
mod tests;

use chrono::Utc;
use futures_util::future::BoxFuture;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

pub use dispatch::{ActiveAddons, DispatchReport};
pub use registry::{AddonFactory, AddonRegistry, parse_configuration};

use crate::config::types::VcsConfig;
use crate::core::process::{ProcessBuilder, ProcessOutput};
use crate::db::{self, DbPool};
use crate::error::{AddonError, ProcessError, SyncResult};
use crate::formats::{TranslationStore, TranslationUnit};
use crate::models::{
    AddonEvent, AddonRecord, AddonScope, Change, ChangeAction, Component, Project, Translation,
    VcsKind,
};
use crate::sync::ComponentHandle;
use crate::utility::template::render;
use crate::vcs::RepositoryLockGuard;

/// Future returned by event handlers.
pub type AddonFuture<'a> = BoxFuture<'a, SyncResult<()>>;

fn done<'a>() -> AddonFuture<'a> {
    Box::pin(std::future::ready(Ok(())))
}

/// Event payloads of the asynchronous lifecycle points.
///
/// `UNIT_PRE_CREATE` and `STORE_POST_LOAD` mutate parsed data in place and
/// have their own synchronous hooks on [`AddonHandler`].
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    PostPush,
    PostUpdate {
        /// Revision before the update.
        previous_revision: &'a str,
        /// The update runs as part of a commit and must not push.
        skip_push: bool,
    },
    PreCommit {
        translation: &'a Translation,
        author: &'a str,
    },
    PostCommit,
    PostAdd {
        translation: &'a Translation,
    },
    PreUpdate,
    PrePush,
    Daily,
    ComponentUpdate,
    Change {
        change: &'a Change,
    },
}

impl Event<'_> {
    #[must_use]
    pub const fn kind(&self) -> AddonEvent {
        match self {
            Self::PostPush => AddonEvent::PostPush,
            Self::PostUpdate { .. } => AddonEvent::PostUpdate,
            Self::PreCommit { .. } => AddonEvent::PreCommit,
            Self::PostCommit => AddonEvent::PostCommit,
            Self::PostAdd { .. } => AddonEvent::PostAdd,
            Self::PreUpdate => AddonEvent::PreUpdate,
            Self::PrePush => AddonEvent::PrePush,
            Self::Daily => AddonEvent::Daily,
            Self::ComponentUpdate => AddonEvent::ComponentUpdate,
            Self::Change { .. } => AddonEvent::Change,
        }
    }
}

/// Which components an addon can be installed on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compatibility {
    /// Accepted format ids, empty for any.
    pub formats: &'static [&'static str],
    /// Accepted backends, empty for any.
    pub vcs: &'static [VcsKind],
    /// Required kind of format, `None` for both.
    pub monolingual: Option<bool>,
}

impl Compatibility {
    pub const ANY: Self = Self {
        formats: &[],
        vcs: &[],
        monolingual: None,
    };

    #[must_use]
    pub fn accepts(&self, component: &Component, monolingual: bool) -> bool {
        (self.formats.is_empty() || self.formats.contains(&component.settings.file_format.as_str()))
            && (self.vcs.is_empty() || self.vcs.contains(&component.settings.vcs))
            && self.monolingual.is_none_or(|wanted| wanted == monolingual)
    }
}

/// Static description of an addon.
#[derive(Debug)]
pub struct AddonMetadata {
    /// Registry name, such as `gettext.linguas`.
    pub name: &'static str,
    pub verbose: &'static str,
    pub description: &'static str,
    /// Events the addon handles; others are never dispatched to it.
    pub events: &'static [AddonEvent],
    pub compatibility: Compatibility,
    /// Scopes it may be installed at.
    pub scopes: &'static [AddonScope],
    /// May be installed more than once on the same target.
    pub multiple: bool,
}

impl AddonMetadata {
    #[must_use]
    pub fn handles(&self, event: AddonEvent) -> bool {
        self.events.contains(&event)
    }
}

/// One addon instance, built from its stored configuration.
///
/// Every event method defaults to doing nothing; an addon overrides the ones
/// listed in its metadata.
pub trait AddonHandler: Send + Sync + std::fmt::Debug {
    fn metadata(&self) -> &'static AddonMetadata;

    /// Configuration as stored.
    fn configuration(&self) -> Value {
        Value::Null
    }

    fn post_push<'a>(&'a self, _ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        done()
    }

    fn post_update<'a>(
        &'a self,
        _ctx: &'a AddonContext<'a>,
        _previous_revision: &'a str,
        _skip_push: bool,
    ) -> AddonFuture<'a> {
        done()
    }

    /// Runs before a translation is committed; files changed here are
    /// registered with [`AddonContext::mark_changed`] and join the commit.
    fn pre_commit<'a>(
        &'a self,
        _ctx: &'a AddonContext<'a>,
        _translation: &'a Translation,
        _author: &'a str,
    ) -> AddonFuture<'a> {
        done()
    }

    fn post_commit<'a>(&'a self, _ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        done()
    }

    fn post_add<'a>(&'a self, _ctx: &'a AddonContext<'a>, _translation: &'a Translation) -> AddonFuture<'a> {
        done()
    }

    fn pre_update<'a>(&'a self, _ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        done()
    }

    fn pre_push<'a>(&'a self, _ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        done()
    }

    fn daily<'a>(&'a self, _ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        done()
    }

    fn component_update<'a>(&'a self, _ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        done()
    }

    fn change<'a>(&'a self, _ctx: &'a AddonContext<'a>, _change: &'a Change) -> AddonFuture<'a> {
        done()
    }

    /// Adjusts a unit read from a file before it is stored for the first time.
    ///
    /// # Errors
    ///
    /// Any error is recorded as an addon alert.
    fn unit_pre_create(&self, _component: &Component, _unit: &mut TranslationUnit) -> SyncResult<()> {
        Ok(())
    }

    /// Adjusts a freshly parsed store.
    ///
    /// # Errors
    ///
    /// Any error is recorded as an addon alert.
    fn store_post_load(
        &self,
        _component: &Component,
        _translation: &Translation,
        _store: &mut TranslationStore,
    ) -> SyncResult<()> {
        Ok(())
    }

    /// Routes an event to its typed method.
    fn handle<'a>(&'a self, ctx: &'a AddonContext<'a>, event: Event<'a>) -> AddonFuture<'a> {
        match event {
            Event::PostPush => self.post_push(ctx),
            Event::PostUpdate {
                previous_revision,
                skip_push,
            } => self.post_update(ctx, previous_revision, skip_push),
            Event::PreCommit {
                translation,
                author,
            } => self.pre_commit(ctx, translation, author),
            Event::PostCommit => self.post_commit(ctx),
            Event::PostAdd { translation } => self.post_add(ctx, translation),
            Event::PreUpdate => self.pre_update(ctx),
            Event::PrePush => self.pre_push(ctx),
            Event::Daily => self.daily(ctx),
            Event::ComponentUpdate => self.component_update(ctx),
            Event::Change { change } => self.change(ctx, change),
        }
    }
}

/// What an addon sees of the component it runs for.
pub struct AddonContext<'a> {
    pub pool: &'a DbPool,
    pub handle: &'a ComponentHandle,
    pub guard: &'a RepositoryLockGuard,
    pub vcs: &'a VcsConfig,
    changed: Mutex<Vec<String>>,
    scans: Mutex<Vec<i64>>,
}

impl std::fmt::Debug for AddonContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonContext")
            .field("component", &self.handle.component.full_slug())
            .field("checkout", &self.handle.checkout)
            .finish_non_exhaustive()
    }
}

impl<'a> AddonContext<'a> {
    #[must_use]
    pub fn new(
        pool: &'a DbPool,
        handle: &'a ComponentHandle,
        guard: &'a RepositoryLockGuard,
        vcs: &'a VcsConfig,
    ) -> Self {
        Self {
            pool,
            handle,
            guard,
            vcs,
            changed: Mutex::new(Vec::new()),
            scans: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn component(&self) -> &Component {
        &self.handle.component
    }

    #[must_use]
    pub fn project(&self) -> &Project {
        &self.handle.project
    }

    /// Absolute path of a checkout-relative file.
    #[must_use]
    pub fn path(&self, filename: &str) -> PathBuf {
        self.handle.checkout.join(filename)
    }

    /// Translations of the component.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn translations(&self) -> SyncResult<Vec<Translation>> {
        db::translations::list_for_component(self.pool, self.handle.component.id).await
    }

    /// Registers a checkout-relative file changed by an addon.
    pub fn mark_changed(&self, filename: impl Into<String>) {
        let filename = filename.into();
        let mut changed = self
            .changed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !changed.contains(&filename) {
            changed.push(filename);
        }
    }

    /// Files registered so far, leaving the list empty.
    pub fn take_changed(&self) -> Vec<String> {
        std::mem::take(
            &mut *self
                .changed
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        )
    }

    /// Asks the synchronizer to scan the files of another component once
    /// the event is handled.
    pub fn request_scan(&self, component_id: i64) {
        self.scans
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(component_id);
    }

    /// Components whose scan was requested, leaving the list empty.
    pub fn take_scan_requests(&self) -> Vec<i64> {
        std::mem::take(
            &mut *self
                .scans
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        )
    }

    /// Commits the registered files with the addon commit message.
    ///
    /// Returns `false` when nothing was registered or nothing changed.
    ///
    /// # Errors
    ///
    /// Returns the VCS error of the commit.
    pub async fn commit_changes(&self, addon: &str) -> SyncResult<bool> {
        let files = self.take_changed();
        if files.is_empty() {
            return Ok(false);
        }
        let mut context = self.handle.template_context();
        context.insert("addon_name".to_string(), Value::String(addon.to_string()));
        let message = render(&self.handle.component.settings.addon_message, &Value::Object(context));
        let author = format!("{} <{}>", self.vcs.committer_name, self.vcs.committer_email);

        let committed = self
            .handle
            .repository
            .commit(self.guard, &message, &author, Utc::now(), &files)
            .await?;
        if committed {
            info!(component = %self.handle.component.full_slug(), addon, files = files.len(), "addon committed changes");
        }
        Ok(committed)
    }

    /// Runs an external tool in the checkout.
    ///
    /// # Errors
    ///
    /// Returns `AddonError::Failed` with the captured output when the tool is
    /// missing or exits unsuccessfully.
    pub async fn run_tool(&self, addon: &str, builder: ProcessBuilder) -> SyncResult<ProcessOutput> {
        let builder = builder.cwd(&self.handle.checkout).capture_output();
        debug!(addon, command = ?builder.args_slice(), "running addon tool");
        builder.run().await.map_err(|e| {
            let output = match &e {
                ProcessError::NonZeroExit { stdout, stderr, .. } => {
                    format!("{}\n{}", stdout.trim(), stderr.trim()).trim().to_string()
                }
                _ => String::new(),
            };
            AddonError::Failed {
                addon: addon.to_string(),
                message: e.to_string(),
                output,
            }
            .into()
        })
    }
}

/// Where an addon is being installed.
#[derive(Debug, Clone, Copy)]
pub enum InstallTarget<'a> {
    Component {
        component: &'a Component,
        monolingual: bool,
    },
    Project(&'a Project),
    Site,
}

impl InstallTarget<'_> {
    const fn scope(&self) -> AddonScope {
        match self {
            Self::Component { .. } => AddonScope::Component,
            Self::Project(_) => AddonScope::Project,
            Self::Site => AddonScope::Site,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Component { component, .. } => component.full_slug(),
            Self::Project(project) => project.slug.clone(),
            Self::Site => "site".to_string(),
        }
    }
}

/// Validates and stores a new addon instance.
///
/// # Errors
///
/// Returns `AddonError` for an unknown addon, a rejected configuration, an
/// unsupported scope, an incompatible component or a second instance of a
/// single-instance addon; or a store error.
pub async fn install(
    pool: &DbPool,
    registry: &AddonRegistry,
    target: InstallTarget<'_>,
    name: &str,
    configuration: &Value,
) -> SyncResult<AddonRecord> {
    let metadata = registry.metadata(name)?;
    let handler = registry.create(name, configuration)?;
    let scope = target.scope();

    if !metadata.scopes.contains(&scope) {
        return Err(AddonError::InvalidConfiguration {
            addon: name.to_string(),
            message: format!("cannot be installed at {scope} scope"),
        }
        .into());
    }
    if let InstallTarget::Component {
        component,
        monolingual,
    } = target
        && !metadata.compatibility.accepts(component, monolingual)
    {
        return Err(AddonError::Incompatible {
            addon: name.to_string(),
            component: component.full_slug(),
        }
        .into());
    }

    let (project_id, component_id) = match target {
        InstallTarget::Component { component, .. } => (Some(component.project_id), Some(component.id)),
        InstallTarget::Project(project) => (Some(project.id), None),
        InstallTarget::Site => (None, None),
    };

    if !metadata.multiple {
        let installed = db::addons::list(pool).await?;
        let duplicate = installed.iter().any(|record| {
            record.name == name
                && record.scope == scope
                && record.component_id == component_id
                && (scope != AddonScope::Project || record.project_id == project_id)
        });
        if duplicate {
            return Err(AddonError::AlreadyInstalled {
                addon: name.to_string(),
                component: target.describe(),
            }
            .into());
        }
    }

    let record = db::addons::install(
        pool,
        name,
        scope,
        project_id,
        component_id,
        &handler.configuration(),
    )
    .await?;

    if let Some(component_id) = component_id {
        db::changes::record(
            pool,
            &db::changes::NewChange::component(ChangeAction::AddonInstalled, component_id)
                .with_details(json!({ "addon": name })),
        )
        .await?;
    }
    info!(addon = name, target = %target.describe(), id = record.id, "addon installed");
    Ok(record)
}
