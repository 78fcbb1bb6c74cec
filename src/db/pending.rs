// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pending-Change Store.
//!
//! ```text
//! store_unit_change()          append snapshot, mark unit pending
//!
//! eligible rows of a unit under a policy:
//!   cutoff = MAX(timestamp) of the unit's changes passing the policy
//!   rows   = every change of the unit with timestamp <= cutoff
//!
//!   policy                  passes
//!   all                     every change
//!   without-needs-editing   state <> needs-editing
//!   approved-only           state >= approved
//!
//! for_translation / for_component   read eligible rows
//! take_for_translation(tx)          DELETE ... RETURNING eligible rows
//! older_than(component, cutoff)     age-based commit batching
//! ```
//!
//! A later ineligible change never hides an earlier eligible one: with
//! `[translated@t1, needs-editing@t2]` under `without-needs-editing` only the
//! t1 row is eligible, and t2 stays queued until a later eligible change
//! arrives.
//!
//! SQLite has no `SELECT ... FOR UPDATE`; the write transaction of
//! [`take_for_translation`] together with the per-checkout file lock keeps
//! two commits from flushing the same rows.

use bon::Builder;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::DbPool;
use crate::error::{StoreError, SyncResult, ValidationError};
use crate::models::{CommitPolicy, PendingUnitChange, Unit, UnitState, from_micros, to_micros};

const COLUMNS: &str = "p.id, p.unit_id, p.author, p.target, p.state, p.explanation, p.add_unit, p.timestamp";

#[derive(sqlx::FromRow)]
struct PendingRow {
    id: i64,
    unit_id: i64,
    author: String,
    target: String,
    state: i64,
    explanation: String,
    add_unit: bool,
    timestamp: i64,
}

impl TryFrom<PendingRow> for PendingUnitChange {
    type Error = StoreError;

    fn try_from(row: PendingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            unit_id: row.unit_id,
            author: row.author,
            target: row.target,
            state: UnitState::from_i64(row.state),
            explanation: row.explanation,
            add_unit: row.add_unit,
            timestamp: from_micros(row.timestamp)?,
        })
    }
}

fn convert(rows: Vec<PendingRow>) -> SyncResult<Vec<PendingUnitChange>> {
    let mut changes = rows
        .into_iter()
        .map(PendingUnitChange::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    changes.sort_by_key(|c| (c.unit_id, c.timestamp, c.id));
    Ok(changes)
}

/// SQL condition on `e` selecting the changes that may end a commit batch.
const fn policy_clause(policy: CommitPolicy) -> &'static str {
    match policy {
        CommitPolicy::All => "1 = 1",
        CommitPolicy::WithoutNeedsEditing => "e.state <> 10",
        CommitPolicy::ApprovedOnly => "e.state >= 30",
    }
}

fn eligible_condition(policy: CommitPolicy) -> String {
    format!(
        "p.timestamp <= (SELECT MAX(e.timestamp) FROM pending_changes e
                          WHERE e.unit_id = p.unit_id AND {})",
        policy_clause(policy)
    )
}

/// An edit to queue.
#[derive(Debug, Clone, Builder)]
pub struct PendingEdit {
    #[builder(into)]
    pub author: String,
    #[builder(into)]
    pub target: String,
    pub state: UnitState,
    #[builder(into, default)]
    pub explanation: String,
    /// The unit does not exist in the file yet.
    #[builder(default)]
    pub add_unit: bool,
    #[builder(default = Utc::now())]
    pub timestamp: DateTime<Utc>,
}

/// Appends a snapshot of an edit and applies it to the unit.
///
/// The unit row is only updated if its target still equals `unit.target`,
/// the value the caller based the edit on.
///
/// # Errors
///
/// Returns `ValidationError::StaleUnit` if the target changed meanwhile, or a
/// store error if a query fails.
pub async fn store_unit_change(
    pool: &DbPool,
    unit: &Unit,
    edit: &PendingEdit,
) -> SyncResult<PendingUnitChange> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE units SET target = ?, state = ?, explanation = ?, pending = 1
         WHERE id = ? AND target = ?",
    )
    .bind(&edit.target)
    .bind(edit.state.as_i64())
    .bind(&edit.explanation)
    .bind(unit.id)
    .bind(&unit.target)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(ValidationError::StaleUnit { unit_id: unit.id }.into());
    }

    let row: PendingRow = sqlx::query_as(
        "INSERT INTO pending_changes (unit_id, author, target, state, explanation, add_unit, timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         RETURNING id, unit_id, author, target, state, explanation, add_unit, timestamp",
    )
    .bind(unit.id)
    .bind(&edit.author)
    .bind(&edit.target)
    .bind(edit.state.as_i64())
    .bind(&edit.explanation)
    .bind(edit.add_unit)
    .bind(to_micros(edit.timestamp))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row.try_into()?)
}

/// Mirrors an edit onto sibling units in one transaction, returning the ids
/// of the units that changed.
///
/// A unit already holding the edited target, or whose target moved away from
/// the snapshot in `units`, is skipped.
///
/// # Errors
///
/// Returns a store error if a query fails; nothing is applied then.
pub async fn store_propagated(pool: &DbPool, units: &[Unit], edit: &PendingEdit) -> SyncResult<Vec<i64>> {
    let mut tx = pool.begin().await?;
    let mut changed = Vec::new();

    for unit in units {
        let updated = sqlx::query(
            "UPDATE units SET target = ?, state = ?, explanation = ?, pending = 1
             WHERE id = ? AND target = ? AND target <> ?",
        )
        .bind(&edit.target)
        .bind(edit.state.as_i64())
        .bind(&edit.explanation)
        .bind(unit.id)
        .bind(&unit.target)
        .bind(&edit.target)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            continue;
        }

        sqlx::query(
            "INSERT INTO pending_changes (unit_id, author, target, state, explanation, add_unit, timestamp)
             VALUES (?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(unit.id)
        .bind(&edit.author)
        .bind(&edit.target)
        .bind(edit.state.as_i64())
        .bind(&edit.explanation)
        .bind(to_micros(edit.timestamp))
        .execute(&mut *tx)
        .await?;
        changed.push(unit.id);
    }

    tx.commit().await?;
    Ok(changed)
}

/// Eligible changes of one translation.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn for_translation(
    pool: &DbPool,
    translation_id: i64,
    policy: CommitPolicy,
) -> SyncResult<Vec<PendingUnitChange>> {
    let rows: Vec<PendingRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM pending_changes p JOIN units u ON u.id = p.unit_id
         WHERE u.translation_id = ? AND {}
         ORDER BY p.unit_id, p.timestamp, p.id",
        eligible_condition(policy)
    ))
    .bind(translation_id)
    .fetch_all(pool)
    .await?;
    convert(rows)
}

/// Eligible changes of every translation of a component.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn for_component(
    pool: &DbPool,
    component_id: i64,
    policy: CommitPolicy,
) -> SyncResult<Vec<PendingUnitChange>> {
    let rows: Vec<PendingRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM pending_changes p
         JOIN units u ON u.id = p.unit_id
         JOIN translations t ON t.id = u.translation_id
         WHERE t.component_id = ? AND {}
         ORDER BY p.unit_id, p.timestamp, p.id",
        eligible_condition(policy)
    ))
    .bind(component_id)
    .fetch_all(pool)
    .await?;
    convert(rows)
}

/// Changes of a component recorded before `cutoff`, regardless of policy.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn older_than(
    pool: &DbPool,
    component_id: i64,
    cutoff: DateTime<Utc>,
) -> SyncResult<Vec<PendingUnitChange>> {
    let rows: Vec<PendingRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM pending_changes p
         JOIN units u ON u.id = p.unit_id
         JOIN translations t ON t.id = u.translation_id
         WHERE t.component_id = ? AND p.timestamp < ?
         ORDER BY p.unit_id, p.timestamp, p.id"
    ))
    .bind(component_id)
    .bind(to_micros(cutoff))
    .fetch_all(pool)
    .await?;
    convert(rows)
}

/// Removes and returns the eligible changes of a translation.
///
/// Runs on the caller's transaction: the rows come back if it rolls back.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn take_for_translation(
    conn: &mut SqliteConnection,
    translation_id: i64,
    policy: CommitPolicy,
) -> SyncResult<Vec<PendingUnitChange>> {
    let rows: Vec<PendingRow> = sqlx::query_as(&format!(
        "DELETE FROM pending_changes WHERE id IN (
             SELECT p.id FROM pending_changes p JOIN units u ON u.id = p.unit_id
             WHERE u.translation_id = ? AND {}
         )
         RETURNING id, unit_id, author, target, state, explanation, add_unit, timestamp",
        eligible_condition(policy)
    ))
    .bind(translation_id)
    .fetch_all(&mut *conn)
    .await?;
    convert(rows)
}

/// Translations of a component with at least one eligible change.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn translations_with_pending(
    pool: &DbPool,
    component_id: i64,
    policy: CommitPolicy,
) -> SyncResult<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as(&format!(
        "SELECT DISTINCT u.translation_id FROM pending_changes p
         JOIN units u ON u.id = p.unit_id
         JOIN translations t ON t.id = u.translation_id
         WHERE t.component_id = ? AND {}
         ORDER BY u.translation_id",
        eligible_condition(policy)
    ))
    .bind(component_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Timestamp of the oldest pending change of a component.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn oldest_for_component(
    pool: &DbPool,
    component_id: i64,
) -> SyncResult<Option<DateTime<Utc>>> {
    let (oldest,): (Option<i64>,) = sqlx::query_as(
        "SELECT MIN(p.timestamp) FROM pending_changes p
         JOIN units u ON u.id = p.unit_id
         JOIN translations t ON t.id = u.translation_id
         WHERE t.component_id = ?",
    )
    .bind(component_id)
    .fetch_one(pool)
    .await?;
    Ok(oldest.map(from_micros).transpose()?)
}

/// Number of pending changes of a component, regardless of policy.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn count_for_component(pool: &DbPool, component_id: i64) -> SyncResult<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM pending_changes p
         JOIN units u ON u.id = p.unit_id
         JOIN translations t ON t.id = u.translation_id
         WHERE t.component_id = ?",
    )
    .bind(component_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Drops every pending change of a component and clears the unit flags.
///
/// # Errors
///
/// Returns a store error if a query fails.
pub async fn discard_for_component(pool: &DbPool, component_id: i64) -> SyncResult<u64> {
    let mut tx = pool.begin().await?;
    let deleted = sqlx::query(
        "DELETE FROM pending_changes WHERE unit_id IN (
             SELECT u.id FROM units u JOIN translations t ON t.id = u.translation_id
             WHERE t.component_id = ?
         )",
    )
    .bind(component_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    sqlx::query(
        "UPDATE units SET pending = 0 WHERE translation_id IN (
             SELECT id FROM translations WHERE component_id = ?
         )",
    )
    .bind(component_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(deleted)
}
