// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Component rows.
//!
//! Settings are stored as the JSON form of [`ComponentConfig`] so the
//! effective configuration at setup time travels with the row.

use sqlx::FromRow;

use super::DbPool;
use crate::config::types::ComponentConfig;
use crate::error::{StoreError, SyncResult};
use crate::models::{Component, LINK_PREFIX, Project};

const SELECT: &str = "SELECT c.id, c.project_id, p.slug AS project_slug, c.slug, c.name, c.settings, c.locked
     FROM components c JOIN projects p ON p.id = c.project_id";

#[derive(FromRow)]
struct ComponentRow {
    id: i64,
    project_id: i64,
    project_slug: String,
    slug: String,
    name: String,
    settings: String,
    locked: bool,
}

impl TryFrom<ComponentRow> for Component {
    type Error = StoreError;

    fn try_from(row: ComponentRow) -> Result<Self, Self::Error> {
        let settings: ComponentConfig =
            serde_json::from_str(&row.settings).map_err(|e| StoreError::Corrupt {
                entity: "component",
                message: format!("{}/{}: {e}", row.project_slug, row.slug),
            })?;
        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            project_slug: row.project_slug,
            slug: row.slug,
            name: row.name,
            settings,
            locked: row.locked,
        })
    }
}

fn convert(rows: Vec<ComponentRow>) -> SyncResult<Vec<Component>> {
    rows.into_iter()
        .map(|row| Component::try_from(row).map_err(Into::into))
        .collect()
}

/// Creates or updates a component; the lock state is preserved.
///
/// # Errors
///
/// Returns a store error if the settings cannot be encoded or the query fails.
pub async fn upsert(
    pool: &DbPool,
    project: &Project,
    slug: &str,
    settings: &ComponentConfig,
) -> SyncResult<Component> {
    let name = if settings.name.is_empty() {
        slug
    } else {
        settings.name.as_str()
    };
    let encoded = serde_json::to_string(settings).map_err(|e| StoreError::Corrupt {
        entity: "component",
        message: e.to_string(),
    })?;

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO components (project_id, slug, name, settings) VALUES (?, ?, ?, ?)
         ON CONFLICT(project_id, slug) DO UPDATE SET name = excluded.name, settings = excluded.settings
         RETURNING id",
    )
    .bind(project.id)
    .bind(slug)
    .bind(name)
    .bind(encoded)
    .fetch_one(pool)
    .await?;

    get(pool, id).await
}

/// Looks up a component by id.
///
/// # Errors
///
/// Returns `StoreError::NotFound` if no such component exists.
pub async fn get(pool: &DbPool, id: i64) -> SyncResult<Component> {
    let row: Option<ComponentRow> = sqlx::query_as(&format!("{SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let row = row.ok_or_else(|| StoreError::NotFound {
        entity: "component",
        key: id.to_string(),
    })?;
    Ok(row.try_into()?)
}

/// Looks up a component by `project/slug`.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn find(pool: &DbPool, project: &str, slug: &str) -> SyncResult<Option<Component>> {
    let row: Option<ComponentRow> =
        sqlx::query_as(&format!("{SELECT} WHERE p.slug = ? AND c.slug = ?"))
            .bind(project)
            .bind(slug)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Component::try_from).transpose()?)
}

/// All components ordered by project and slug.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list(pool: &DbPool) -> SyncResult<Vec<Component>> {
    let rows: Vec<ComponentRow> = sqlx::query_as(&format!("{SELECT} ORDER BY p.slug, c.slug"))
        .fetch_all(pool)
        .await?;
    convert(rows)
}

/// Components of one project.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_for_project(pool: &DbPool, project_id: i64) -> SyncResult<Vec<Component>> {
    let rows: Vec<ComponentRow> =
        sqlx::query_as(&format!("{SELECT} WHERE c.project_id = ? ORDER BY c.slug"))
            .bind(project_id)
            .fetch_all(pool)
            .await?;
    convert(rows)
}

/// Components sharing the checkout of `component` through `link://`.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn linked_children(pool: &DbPool, component: &Component) -> SyncResult<Vec<Component>> {
    let link = format!("{LINK_PREFIX}{}", component.full_slug());
    let rows: Vec<ComponentRow> = sqlx::query_as(&format!(
        "{SELECT} WHERE json_extract(c.settings, '$.repo') = ? ORDER BY p.slug, c.slug"
    ))
    .bind(link)
    .fetch_all(pool)
    .await?;
    convert(rows)
}

/// Sets the lock flag.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn set_locked(pool: &DbPool, id: i64, locked: bool) -> SyncResult<()> {
    sqlx::query("UPDATE components SET locked = ? WHERE id = ?")
        .bind(locked)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes a component; translations, units, pending changes and alerts cascade.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn delete(pool: &DbPool, id: i64) -> SyncResult<()> {
    sqlx::query("DELETE FROM components WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
