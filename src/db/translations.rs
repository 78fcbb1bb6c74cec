// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Translation rows.

use super::DbPool;
use crate::error::{StoreError, SyncError, SyncResult, ValidationError};
use crate::models::Translation;

const SELECT: &str = "SELECT id, component_id, language_code, filename, plural_count, revision, is_source
     FROM translations";

#[derive(sqlx::FromRow)]
struct TranslationRow {
    id: i64,
    component_id: i64,
    language_code: String,
    filename: String,
    plural_count: i64,
    revision: String,
    is_source: bool,
}

impl From<TranslationRow> for Translation {
    fn from(row: TranslationRow) -> Self {
        Self {
            id: row.id,
            component_id: row.component_id,
            language_code: row.language_code,
            filename: row.filename,
            plural_count: row.plural_count,
            revision: row.revision,
            is_source: row.is_source,
        }
    }
}

/// Creates a translation with an empty revision so the next scan parses it.
///
/// # Errors
///
/// Returns `ValidationError::TranslationExists` if the language already has
/// a row, or a store error if the query fails.
pub async fn create(
    pool: &DbPool,
    component_id: i64,
    language_code: &str,
    filename: &str,
    plural_count: i64,
    is_source: bool,
) -> SyncResult<Translation> {
    let row: TranslationRow = sqlx::query_as(
        "INSERT INTO translations (component_id, language_code, filename, plural_count, is_source)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id, component_id, language_code, filename, plural_count, revision, is_source",
    )
    .bind(component_id)
    .bind(language_code)
    .bind(filename)
    .bind(plural_count)
    .bind(is_source)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            SyncError::from(ValidationError::TranslationExists {
                language: language_code.to_string(),
                path: filename.to_string(),
            })
        }
        other => other.into(),
    })?;
    Ok(row.into())
}

/// Looks up a translation by id.
///
/// # Errors
///
/// Returns `StoreError::NotFound` if no such translation exists.
pub async fn get(pool: &DbPool, id: i64) -> SyncResult<Translation> {
    let row: Option<TranslationRow> = sqlx::query_as(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Into::into).ok_or_else(|| {
        StoreError::NotFound {
            entity: "translation",
            key: id.to_string(),
        }
        .into()
    })
}

/// Looks up the translation of a component into one language.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn find(
    pool: &DbPool,
    component_id: i64,
    language_code: &str,
) -> SyncResult<Option<Translation>> {
    let row: Option<TranslationRow> =
        sqlx::query_as(&format!("{SELECT} WHERE component_id = ? AND language_code = ?"))
            .bind(component_id)
            .bind(language_code)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Into::into))
}

/// Translations of a component ordered by language code.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_for_component(pool: &DbPool, component_id: i64) -> SyncResult<Vec<Translation>> {
    let rows: Vec<TranslationRow> =
        sqlx::query_as(&format!("{SELECT} WHERE component_id = ? ORDER BY language_code"))
            .bind(component_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Records the content revision and plural count of the last good parse.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn update_revision(
    pool: &DbPool,
    id: i64,
    revision: &str,
    plural_count: i64,
) -> SyncResult<()> {
    sqlx::query("UPDATE translations SET revision = ?, plural_count = ? WHERE id = ?")
        .bind(revision)
        .bind(plural_count)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes a translation with its units and pending changes.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn delete(pool: &DbPool, id: i64) -> SyncResult<()> {
    sqlx::query("DELETE FROM translations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
