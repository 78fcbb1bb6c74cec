// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Installed addon rows.

use serde_json::Value;

use super::{DbPool, enum_column, json_column};
use crate::error::{StoreError, SyncResult};
use crate::models::{AddonRecord, AddonScope, Component};

const SELECT: &str = "SELECT id, name, scope, project_id, component_id, configuration, position
     FROM addons";

#[derive(sqlx::FromRow)]
struct AddonRow {
    id: i64,
    name: String,
    scope: String,
    project_id: Option<i64>,
    component_id: Option<i64>,
    configuration: String,
    position: i64,
}

impl TryFrom<AddonRow> for AddonRecord {
    type Error = StoreError;

    fn try_from(row: AddonRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            scope: enum_column("addon", &row.scope)?,
            project_id: row.project_id,
            component_id: row.component_id,
            configuration: json_column("addon", &row.configuration)?,
            position: row.position,
        })
    }
}

fn convert(rows: Vec<AddonRow>) -> SyncResult<Vec<AddonRecord>> {
    rows.into_iter()
        .map(|row| AddonRecord::try_from(row).map_err(Into::into))
        .collect()
}

/// Installs an addon at the end of the install order.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn install(
    pool: &DbPool,
    name: &str,
    scope: AddonScope,
    project_id: Option<i64>,
    component_id: Option<i64>,
    configuration: &Value,
) -> SyncResult<AddonRecord> {
    let row: AddonRow = sqlx::query_as(
        "INSERT INTO addons (name, scope, project_id, component_id, configuration, position)
         VALUES (?, ?, ?, ?, ?, (SELECT COALESCE(MAX(position), 0) + 1 FROM addons))
         RETURNING id, name, scope, project_id, component_id, configuration, position",
    )
    .bind(name)
    .bind(scope.as_str())
    .bind(project_id)
    .bind(component_id)
    .bind(configuration.to_string())
    .fetch_one(pool)
    .await?;
    Ok(row.try_into()?)
}

/// Removes an installed addon; returns whether it existed.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn remove(pool: &DbPool, id: i64) -> SyncResult<bool> {
    let result = sqlx::query("DELETE FROM addons WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Every installed addon in install order.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list(pool: &DbPool) -> SyncResult<Vec<AddonRecord>> {
    let rows: Vec<AddonRow> = sqlx::query_as(&format!("{SELECT} ORDER BY position, id"))
        .fetch_all(pool)
        .await?;
    convert(rows)
}

/// Addons applying to a component: its own, its project's and site-wide ones,
/// in install order.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn for_component(pool: &DbPool, component: &Component) -> SyncResult<Vec<AddonRecord>> {
    let rows: Vec<AddonRow> = sqlx::query_as(&format!(
        "{SELECT}
         WHERE (scope = 'component' AND component_id = ?)
            OR (scope = 'project' AND project_id = ?)
            OR scope = 'site'
         ORDER BY position, id"
    ))
    .bind(component.id)
    .bind(component.project_id)
    .fetch_all(pool)
    .await?;
    convert(rows)
}
