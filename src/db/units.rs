// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Unit rows.
//!
//! ```text
//! file scan --> upsert_from_file()   pending units keep their database target
//!           --> delete_missing()     pending units survive
//! translate --> pending::store_unit_change() sets target + pending
//! commit    --> clear_pending()      once no pending change remains
//! ```

use std::collections::HashSet;

use sqlx::SqliteConnection;

use super::DbPool;
use crate::error::{StoreError, SyncResult};
use crate::models::{Unit, UnitState};

const SELECT: &str = "SELECT id, translation_id, id_hash, context, source, target, state,
            explanation, flags, position, pending
     FROM units";

#[derive(sqlx::FromRow)]
struct UnitRow {
    id: i64,
    translation_id: i64,
    id_hash: i64,
    context: String,
    source: String,
    target: String,
    state: i64,
    explanation: String,
    flags: String,
    position: i64,
    pending: bool,
}

impl From<UnitRow> for Unit {
    fn from(row: UnitRow) -> Self {
        Self {
            id: row.id,
            translation_id: row.translation_id,
            id_hash: row.id_hash,
            context: row.context,
            source: row.source,
            target: row.target,
            state: UnitState::from_i64(row.state),
            explanation: row.explanation,
            flags: row.flags,
            position: row.position,
            pending: row.pending,
        }
    }
}

/// Unit content read from a translation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitData {
    pub id_hash: i64,
    pub context: String,
    pub source: String,
    pub target: String,
    pub state: UnitState,
    pub explanation: String,
    pub flags: String,
    pub position: i64,
}

/// Units of a translation in file order.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_for_translation(pool: &DbPool, translation_id: i64) -> SyncResult<Vec<Unit>> {
    let rows: Vec<UnitRow> =
        sqlx::query_as(&format!("{SELECT} WHERE translation_id = ? ORDER BY position, id"))
            .bind(translation_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Looks up a unit by id.
///
/// # Errors
///
/// Returns `StoreError::NotFound` if no such unit exists.
pub async fn get(pool: &DbPool, id: i64) -> SyncResult<Unit> {
    let row: Option<UnitRow> = sqlx::query_as(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Into::into).ok_or_else(|| {
        StoreError::NotFound {
            entity: "unit",
            key: id.to_string(),
        }
        .into()
    })
}

/// Units sharing `unit`'s identity hash and language in other components of
/// the same project, paired with their component id.
///
/// Locked components and read-only units are left out.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn siblings(pool: &DbPool, unit: &Unit) -> SyncResult<Vec<(i64, Unit)>> {
    #[derive(sqlx::FromRow)]
    struct SiblingRow {
        component_id: i64,
        #[sqlx(flatten)]
        unit: UnitRow,
    }

    let rows: Vec<SiblingRow> = sqlx::query_as(
        "SELECT c.id AS component_id, u.id, u.translation_id, u.id_hash, u.context, u.source,
                u.target, u.state, u.explanation, u.flags, u.position, u.pending
         FROM units u
         JOIN translations t ON t.id = u.translation_id
         JOIN components c ON c.id = t.component_id
         JOIN translations ot ON ot.id = ?
         JOIN components oc ON oc.id = ot.component_id
         WHERE u.id_hash = ? AND u.id <> ?
           AND t.language_code = ot.language_code
           AND c.project_id = oc.project_id AND c.id <> oc.id
           AND c.locked = 0 AND u.state <> ?
         ORDER BY c.id, u.id",
    )
    .bind(unit.translation_id)
    .bind(unit.id_hash)
    .bind(unit.id)
    .bind(UnitState::ReadOnly.as_i64())
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.component_id, row.unit.into()))
        .collect())
}

/// Inserts or refreshes a unit from file content, returning its id.
///
/// A unit with pending changes keeps its database target and state.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn upsert_from_file(
    conn: &mut SqliteConnection,
    translation_id: i64,
    data: &UnitData,
) -> SyncResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO units (translation_id, id_hash, context, source, target, state, explanation, flags, position)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(translation_id, id_hash) DO UPDATE SET
             context = excluded.context,
             source = excluded.source,
             target = CASE WHEN units.pending THEN units.target ELSE excluded.target END,
             state = CASE WHEN units.pending THEN units.state ELSE excluded.state END,
             explanation = CASE WHEN units.pending THEN units.explanation ELSE excluded.explanation END,
             flags = excluded.flags,
             position = excluded.position
         RETURNING id",
    )
    .bind(translation_id)
    .bind(data.id_hash)
    .bind(&data.context)
    .bind(&data.source)
    .bind(&data.target)
    .bind(data.state.as_i64())
    .bind(&data.explanation)
    .bind(&data.flags)
    .bind(data.position)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Creates a unit that does not exist in the file yet.
///
/// # Errors
///
/// Returns a store error if a unit with the same hash exists or the query fails.
pub async fn create(pool: &DbPool, translation_id: i64, data: &UnitData) -> SyncResult<Unit> {
    let row: UnitRow = sqlx::query_as(
        "INSERT INTO units (translation_id, id_hash, context, source, target, state, explanation, flags, position)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id, translation_id, id_hash, context, source, target, state,
                   explanation, flags, position, pending",
    )
    .bind(translation_id)
    .bind(data.id_hash)
    .bind(&data.context)
    .bind(&data.source)
    .bind(&data.target)
    .bind(data.state.as_i64())
    .bind(&data.explanation)
    .bind(&data.flags)
    .bind(data.position)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Deletes units of a translation that were not seen in the file.
///
/// Units with pending changes are kept, they may be queued additions.
/// Returns the number of deleted units.
///
/// # Errors
///
/// Returns a store error if a query fails.
pub async fn delete_missing(
    conn: &mut SqliteConnection,
    translation_id: i64,
    seen: &HashSet<i64>,
) -> SyncResult<u64> {
    let existing: Vec<(i64,)> =
        sqlx::query_as("SELECT id FROM units WHERE translation_id = ? AND pending = 0")
            .bind(translation_id)
            .fetch_all(&mut *conn)
            .await?;

    let mut deleted = 0;
    for (id,) in existing.into_iter().filter(|(id,)| !seen.contains(id)) {
        deleted += sqlx::query("DELETE FROM units WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }
    Ok(deleted)
}

/// Clears the pending flag of units whose pending changes were all consumed.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn clear_pending(conn: &mut SqliteConnection, translation_id: i64) -> SyncResult<()> {
    sqlx::query(
        "UPDATE units SET pending = 0
         WHERE translation_id = ? AND pending = 1
           AND NOT EXISTS (SELECT 1 FROM pending_changes p WHERE p.unit_id = units.id)",
    )
    .bind(translation_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Translation progress of one translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub all: i64,
    pub translated: i64,
}

impl Stats {
    /// Translated share rounded to one decimal.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn translated_percent(self) -> f64 {
        if self.all == 0 {
            return 0.0;
        }
        (self.translated as f64 * 1000.0 / self.all as f64).round() / 10.0
    }
}

/// Counts all and translated units of a translation.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn stats(pool: &DbPool, translation_id: i64) -> SyncResult<Stats> {
    let (all, translated): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN state >= ? THEN 1 ELSE 0 END), 0)
         FROM units WHERE translation_id = ?",
    )
    .bind(UnitState::Translated.as_i64())
    .bind(translation_id)
    .fetch_one(pool)
    .await?;
    Ok(Stats { all, translated })
}
