// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Runs the addons of one component.

use serde_json::json;
use tracing::{debug, error, warn};

use super::{AddonContext, AddonHandler, AddonRegistry, Event};
use crate::db::{self, DbPool};
use crate::error::{AddonError, ProcessError, SyncError, SyncResult};
use crate::formats::{TranslationStore, TranslationUnit};
use crate::models::{AddonEvent, AddonRecord, AlertKind, Component, Translation};

#[derive(Debug)]
struct ActiveAddon {
    record: AddonRecord,
    handler: Box<dyn AddonHandler>,
}

/// Addons applying to one component, in install order.
#[derive(Debug, Default)]
pub struct ActiveAddons {
    entries: Vec<ActiveAddon>,
}

impl ActiveAddons {
    /// Loads the component, project and site addons of `component`.
    ///
    /// An addon whose stored configuration no longer validates is reported
    /// and left out; one incompatible with the component is skipped.
    ///
    /// # Errors
    ///
    /// Returns a store error if the addon rows cannot be read.
    pub async fn load(
        pool: &DbPool,
        registry: &AddonRegistry,
        component: &Component,
        monolingual: bool,
    ) -> SyncResult<Self> {
        let mut entries = Vec::new();
        for record in db::addons::for_component(pool, component).await? {
            let handler = match registry.create(&record.name, &record.configuration) {
                Ok(handler) => handler,
                Err(e) => {
                    record_failure(pool, component, &record.name, &SyncError::from(e)).await;
                    continue;
                }
            };
            if !handler.metadata().compatibility.accepts(component, monolingual) {
                debug!(component = %component.full_slug(), addon = %record.name, "addon not compatible, skipping");
                continue;
            }
            entries.push(ActiveAddon { record, handler });
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the loaded addons in install order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.record.name.as_str())
    }

    /// Whether any loaded addon handles `event`.
    #[must_use]
    pub fn handles(&self, event: AddonEvent) -> bool {
        self.entries.iter().any(|entry| entry.handler.metadata().handles(event))
    }

    fn subscribed(&self, event: AddonEvent) -> impl Iterator<Item = &ActiveAddon> {
        self.entries
            .iter()
            .filter(move |entry| entry.handler.metadata().handles(event))
    }

    /// Runs `event` on every subscribed addon; returns the number of failures.
    ///
    /// A failing addon is logged and recorded as an `addon-error` alert; the
    /// remaining addons still run.
    pub async fn dispatch(&self, ctx: &AddonContext<'_>, event: Event<'_>) -> usize {
        self.run(ctx, event).await.settle(ctx.pool, ctx.component()).await
    }

    /// Runs `event` without touching the alerts table.
    ///
    /// Used while the caller holds a write transaction; the report is
    /// settled once it is committed.
    pub async fn run(&self, ctx: &AddonContext<'_>, event: Event<'_>) -> DispatchReport {
        let kind = event.kind();
        let mut report = DispatchReport::default();
        for entry in self.subscribed(kind) {
            debug!(component = %ctx.component().full_slug(), addon = %entry.record.name, event = %kind, "running addon");
            let result = entry.handler.handle(ctx, event).await;
            report.results.push((entry.record.name.clone(), result));
        }
        report
    }

    /// Runs the `store-post-load` hooks on a parsed store.
    pub async fn store_post_load(
        &self,
        pool: &DbPool,
        component: &Component,
        translation: &Translation,
        store: &mut TranslationStore,
    ) {
        for entry in self.subscribed(AddonEvent::StorePostLoad) {
            if let Err(e) = entry.handler.store_post_load(component, translation, store) {
                record_failure(pool, component, &entry.record.name, &e).await;
            }
        }
    }

    /// Runs the `unit-pre-create` hooks on a unit about to be stored.
    pub async fn unit_pre_create(&self, pool: &DbPool, component: &Component, unit: &mut TranslationUnit) {
        for entry in self.subscribed(AddonEvent::UnitPreCreate) {
            if let Err(e) = entry.handler.unit_pre_create(component, unit) {
                record_failure(pool, component, &entry.record.name, &e).await;
            }
        }
    }
}

/// Per-addon results of one event.
#[derive(Debug, Default)]
#[must_use]
pub struct DispatchReport {
    results: Vec<(String, SyncResult<()>)>,
}

impl DispatchReport {
    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|(_, result)| result.is_err()).count()
    }

    /// Records failures as alerts and clears those of addons that succeeded;
    /// returns the number of failures.
    pub async fn settle(self, pool: &DbPool, component: &Component) -> usize {
        let mut failures = 0;
        for (addon, result) in self.results {
            match result {
                Ok(()) => clear_failure(pool, component, &addon).await,
                Err(e) => {
                    failures += 1;
                    record_failure(pool, component, &addon, &e).await;
                }
            }
        }
        failures
    }
}

/// Command output carried by an error, for the alert.
fn failure_output(error: &SyncError) -> String {
    match error {
        SyncError::Addon(e) => match e.as_ref() {
            AddonError::Failed { output, .. } => output.clone(),
            _ => String::new(),
        },
        SyncError::Vcs(e) => e.output().unwrap_or_default(),
        SyncError::Process(e) => match e.as_ref() {
            ProcessError::NonZeroExit { stdout, stderr, .. } => {
                format!("{}\n{}", stdout.trim(), stderr.trim()).trim().to_string()
            }
            _ => String::new(),
        },
        _ => String::new(),
    }
}

async fn record_failure(pool: &DbPool, component: &Component, addon: &str, error: &SyncError) {
    error!(component = %component.full_slug(), addon, error = %error, "addon failed");
    let details = json!({
        "addon": addon,
        "error": error.to_string(),
        "output": failure_output(error),
    });
    if let Err(e) = db::alerts::raise_for(pool, component.id, None, AlertKind::AddonError, addon, &details).await {
        warn!(component = %component.full_slug(), error = %e, "failed to record addon alert");
    }
}

/// Clears the alert of an addon once it succeeds.
async fn clear_failure(pool: &DbPool, component: &Component, addon: &str) {
    if let Err(e) = db::alerts::clear_for(pool, component.id, None, AlertKind::AddonError, addon).await {
        warn!(component = %component.full_slug(), error = %e, "failed to clear addon alert");
    }
}
