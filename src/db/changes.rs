// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Audit log.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{DbPool, enum_column, json_column, now_micros};
use crate::error::{StoreError, SyncResult};
use crate::models::{Change, ChangeAction, from_micros, to_micros};

#[derive(sqlx::FromRow)]
struct ChangeRow {
    id: i64,
    action: String,
    component_id: i64,
    translation_id: Option<i64>,
    unit_id: Option<i64>,
    author: String,
    details: String,
    timestamp: i64,
}

impl TryFrom<ChangeRow> for Change {
    type Error = StoreError;

    fn try_from(row: ChangeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            action: enum_column("change", &row.action)?,
            component_id: row.component_id,
            translation_id: row.translation_id,
            unit_id: row.unit_id,
            author: row.author,
            details: json_column("change", &row.details)?,
            timestamp: from_micros(row.timestamp)?,
        })
    }
}

/// A new audit row.
#[derive(Debug, Clone)]
pub struct NewChange {
    pub action: ChangeAction,
    pub component_id: i64,
    pub translation_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub author: String,
    pub details: Value,
}

impl NewChange {
    /// Component-level change without author or details.
    #[must_use]
    pub fn component(action: ChangeAction, component_id: i64) -> Self {
        Self {
            action,
            component_id,
            translation_id: None,
            unit_id: None,
            author: String::new(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    #[must_use]
    pub const fn with_translation(mut self, translation_id: i64) -> Self {
        self.translation_id = Some(translation_id);
        self
    }

    #[must_use]
    pub const fn with_unit(mut self, unit_id: i64) -> Self {
        self.unit_id = Some(unit_id);
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Appends an audit row.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn record(pool: &DbPool, change: &NewChange) -> SyncResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO changes (action, component_id, translation_id, unit_id, author, details, timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(change.action.as_str())
    .bind(change.component_id)
    .bind(change.translation_id)
    .bind(change.unit_id)
    .bind(&change.author)
    .bind(change.details.to_string())
    .bind(now_micros())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Most recent audit rows of a component, newest first.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_for_component(
    pool: &DbPool,
    component_id: i64,
    limit: i64,
) -> SyncResult<Vec<Change>> {
    let rows: Vec<ChangeRow> = sqlx::query_as(
        "SELECT id, action, component_id, translation_id, unit_id, author, details, timestamp
         FROM changes WHERE component_id = ? ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(component_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    rows.into_iter()
        .map(|row| Change::try_from(row).map_err(Into::into))
        .collect()
}

/// Deletes audit rows older than `cutoff`, returning how many were removed.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn delete_older_than(pool: &DbPool, cutoff: DateTime<Utc>) -> SyncResult<u64> {
    let result = sqlx::query("DELETE FROM changes WHERE timestamp < ?")
        .bind(to_micros(cutoff))
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
