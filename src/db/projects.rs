// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Project rows.

use sqlx::FromRow;

use super::{DbPool, enum_column};
use crate::error::{StoreError, SyncResult};
use crate::models::{CommitPolicy, Project};

#[derive(FromRow)]
struct ProjectRow {
    id: i64,
    slug: String,
    name: String,
    commit_policy: String,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            commit_policy: enum_column("project", &row.commit_policy)?,
            id: row.id,
            slug: row.slug,
            name: row.name,
        })
    }
}

/// Creates or updates a project by slug, returning it.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn upsert(
    pool: &DbPool,
    slug: &str,
    name: &str,
    commit_policy: CommitPolicy,
) -> SyncResult<Project> {
    let row: ProjectRow = sqlx::query_as(
        "INSERT INTO projects (slug, name, commit_policy) VALUES (?, ?, ?)
         ON CONFLICT(slug) DO UPDATE SET name = excluded.name, commit_policy = excluded.commit_policy
         RETURNING id, slug, name, commit_policy",
    )
    .bind(slug)
    .bind(name)
    .bind(commit_policy.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row.try_into()?)
}

/// Looks up a project by id.
///
/// # Errors
///
/// Returns `StoreError::NotFound` if no such project exists.
pub async fn get(pool: &DbPool, id: i64) -> SyncResult<Project> {
    let row: Option<ProjectRow> =
        sqlx::query_as("SELECT id, slug, name, commit_policy FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    let row = row.ok_or_else(|| StoreError::NotFound {
        entity: "project",
        key: id.to_string(),
    })?;
    Ok(row.try_into()?)
}

/// Looks up a project by slug.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn find_by_slug(pool: &DbPool, slug: &str) -> SyncResult<Option<Project>> {
    let row: Option<ProjectRow> =
        sqlx::query_as("SELECT id, slug, name, commit_policy FROM projects WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Project::try_from).transpose()?)
}

/// All projects ordered by slug.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list(pool: &DbPool) -> SyncResult<Vec<Project>> {
    let rows: Vec<ProjectRow> =
        sqlx::query_as("SELECT id, slug, name, commit_policy FROM projects ORDER BY slug")
            .fetch_all(pool)
            .await?;
    rows.into_iter()
        .map(|row| Project::try_from(row).map_err(Into::into))
        .collect()
}
