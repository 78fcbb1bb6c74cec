// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Queueing edits made outside the checkout.

use std::collections::HashMap;

use serde_json::json;
use tracing::{debug, warn};

use super::Synchronizer;
use crate::addons::Event;
use crate::db::{self, changes::NewChange, pending::PendingEdit};
use crate::error::{SyncResult, ValidationError};
use crate::models::{AddonEvent, Change, ChangeAction, Component, Unit, UnitState};

impl Synchronizer {
    /// Queues an edit of a unit for the next commit.
    ///
    /// `expected_target` is the target the editor started from; the edit is
    /// refused if the unit changed since.
    ///
    /// The edit is mirrored onto units with the same identity hash and
    /// language in the project's other components sharing the source
    /// language. Mirroring is best effort and never fails the edit.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ComponentLocked`, `ReadOnlyUnit` or
    /// `StaleUnit`, or a store error. Change addons failing become alerts.
    pub async fn translate(&self, unit_id: i64, expected_target: &str, edit: &PendingEdit) -> SyncResult<Unit> {
        let mut unit = db::units::get(&self.pool, unit_id).await?;
        let translation = db::translations::get(&self.pool, unit.translation_id).await?;
        let component = db::components::get(&self.pool, translation.component_id).await?;
        if component.locked {
            return Err(ValidationError::ComponentLocked {
                component: component.full_slug(),
            }
            .into());
        }
        if unit.state == UnitState::ReadOnly {
            return Err(ValidationError::ReadOnlyUnit { unit_id }.into());
        }

        expected_target.clone_into(&mut unit.target);
        let pending = db::pending::store_unit_change(&self.pool, &unit, edit).await?;
        let details = json!({
            "previous": expected_target,
            "target": edit.target,
            "state": edit.state.as_i64(),
        });
        let change_id = db::changes::record(
            &self.pool,
            &NewChange::component(ChangeAction::Translate, component.id)
                .with_translation(translation.id)
                .with_unit(unit_id)
                .with_author(edit.author.clone())
                .with_details(details.clone()),
        )
        .await?;
        debug!(component = %component.full_slug(), unit = unit_id, "edit queued");

        if let Err(e) = self.propagate(&component, &unit, edit).await {
            warn!(component = %component.full_slug(), unit = unit_id, error = %e, "propagation failed");
        }

        let handle = self.open(&component).await?;
        let addons = self.load_addons(&handle).await?;
        if addons.handles(AddonEvent::Change) {
            let change = Change {
                id: change_id,
                action: ChangeAction::Translate,
                component_id: component.id,
                translation_id: Some(translation.id),
                unit_id: Some(unit_id),
                author: edit.author.clone(),
                details,
                timestamp: pending.timestamp,
            };
            let guard = handle.acquire(self.lock_timeout()).await?;
            self.fire(&handle, &guard, &addons, Event::Change { change: &change })
                .await?;
        }
        db::units::get(&self.pool, unit_id).await
    }

    async fn propagate(&self, component: &Component, unit: &Unit, edit: &PendingEdit) -> SyncResult<()> {
        let mut same_source: HashMap<i64, bool> = HashMap::new();
        let mut targets = Vec::new();
        for (component_id, sibling) in db::units::siblings(&self.pool, unit).await? {
            let shares_source = match same_source.get(&component_id) {
                Some(&shares) => shares,
                None => {
                    let other = db::components::get(&self.pool, component_id).await?;
                    let shares = other.settings.source_language == component.settings.source_language;
                    same_source.insert(component_id, shares);
                    shares
                }
            };
            if shares_source && sibling.target != edit.target {
                targets.push(sibling);
            }
        }
        if targets.is_empty() {
            return Ok(());
        }

        let changed = db::pending::store_propagated(&self.pool, &targets, edit).await?;
        for sibling in targets.iter().filter(|u| changed.contains(&u.id)) {
            let translation = db::translations::get(&self.pool, sibling.translation_id).await?;
            db::changes::record(
                &self.pool,
                &NewChange::component(ChangeAction::Propagate, translation.component_id)
                    .with_translation(translation.id)
                    .with_unit(sibling.id)
                    .with_author(edit.author.clone())
                    .with_details(json!({
                        "previous": sibling.target,
                        "target": edit.target,
                        "origin": unit.id,
                    })),
            )
            .await?;
        }
        debug!(component = %component.full_slug(), unit = unit.id, count = changed.len(), "edit propagated");
        Ok(())
    }
}
