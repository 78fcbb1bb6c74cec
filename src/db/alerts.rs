// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persistent alerts.
//!
//! One row per (component, translation, kind, subject); raising an existing
//! alert bumps its occurrence count and replaces the details. The subject
//! is empty except for alerts raised by addons, which carry the addon name.

use serde_json::Value;

use super::{DbPool, enum_column, json_column, now_micros};
use crate::error::{StoreError, SyncResult};
use crate::models::{Alert, AlertKind, from_micros};

const SELECT: &str = "SELECT id, component_id, translation_id, kind, subject, details, occurrences, created, updated
     FROM alerts";

#[derive(sqlx::FromRow)]
struct AlertRow {
    id: i64,
    component_id: i64,
    translation_id: Option<i64>,
    kind: String,
    subject: String,
    details: String,
    occurrences: i64,
    created: i64,
    updated: i64,
}

impl TryFrom<AlertRow> for Alert {
    type Error = StoreError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            component_id: row.component_id,
            translation_id: row.translation_id,
            kind: enum_column("alert", &row.kind)?,
            subject: row.subject,
            details: json_column("alert", &row.details)?,
            occurrences: row.occurrences,
            created: from_micros(row.created)?,
            updated: from_micros(row.updated)?,
        })
    }
}

/// Raises an alert, returning it with the updated occurrence count.
///
/// # Errors
///
/// Returns a store error if a query fails.
pub async fn raise(
    pool: &DbPool,
    component_id: i64,
    translation_id: Option<i64>,
    kind: AlertKind,
    details: &Value,
) -> SyncResult<Alert> {
    raise_for(pool, component_id, translation_id, kind, "", details).await
}

/// Raises the alert of one `subject` within `kind`.
///
/// # Errors
///
/// Returns a store error if a query fails.
pub async fn raise_for(
    pool: &DbPool,
    component_id: i64,
    translation_id: Option<i64>,
    kind: AlertKind,
    subject: &str,
    details: &Value,
) -> SyncResult<Alert> {
    let now = now_micros();
    let mut tx = pool.begin().await?;

    let existing: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM alerts
         WHERE component_id = ? AND translation_id IS ? AND kind = ? AND subject = ?",
    )
    .bind(component_id)
    .bind(translation_id)
    .bind(kind.as_str())
    .bind(subject)
    .fetch_optional(&mut *tx)
    .await?;

    let id = if let Some((id,)) = existing {
        sqlx::query(
            "UPDATE alerts SET details = ?, occurrences = occurrences + 1, updated = ? WHERE id = ?",
        )
        .bind(details.to_string())
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        id
    } else {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO alerts (component_id, translation_id, kind, subject, details, created, updated)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(component_id)
        .bind(translation_id)
        .bind(kind.as_str())
        .bind(subject)
        .bind(details.to_string())
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        id
    };

    let row: AlertRow = sqlx::query_as(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(row.try_into()?)
}

/// Clears an alert; returns whether one existed.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn clear(
    pool: &DbPool,
    component_id: i64,
    translation_id: Option<i64>,
    kind: AlertKind,
) -> SyncResult<bool> {
    clear_for(pool, component_id, translation_id, kind, "").await
}

/// Clears the alert of one `subject` within `kind`.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn clear_for(
    pool: &DbPool,
    component_id: i64,
    translation_id: Option<i64>,
    kind: AlertKind,
    subject: &str,
) -> SyncResult<bool> {
    let result = sqlx::query(
        "DELETE FROM alerts
         WHERE component_id = ? AND translation_id IS ? AND kind = ? AND subject = ?",
    )
    .bind(component_id)
    .bind(translation_id)
    .bind(kind.as_str())
    .bind(subject)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether a component or translation has an alert of `kind`, whatever
/// its subject.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn exists(
    pool: &DbPool,
    component_id: i64,
    translation_id: Option<i64>,
    kind: AlertKind,
) -> SyncResult<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM alerts WHERE component_id = ? AND translation_id IS ? AND kind = ? LIMIT 1",
    )
    .bind(component_id)
    .bind(translation_id)
    .bind(kind.as_str())
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Alerts of a component, oldest first.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_for_component(pool: &DbPool, component_id: i64) -> SyncResult<Vec<Alert>> {
    let rows: Vec<AlertRow> =
        sqlx::query_as(&format!("{SELECT} WHERE component_id = ? ORDER BY created, id"))
            .bind(component_id)
            .fetch_all(pool)
            .await?;
    rows.into_iter()
        .map(|row| Alert::try_from(row).map_err(Into::into))
        .collect()
}
