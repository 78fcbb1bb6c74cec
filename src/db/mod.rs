// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! SQLite persistence.
//!
//! ```text
//! initialize(path)
//!   create parent dir --> create_pool (WAL) --> run_migrations
//!
//! projects    components   translations   units
//! pending     (Pending-Change Store)
//! changes     (audit log)   alerts   addons
//! ```
//!
//! Every query module takes `&DbPool` or a connection/transaction so the
//! synchronizer decides the transaction boundaries.

pub mod addons;
pub mod alerts;
pub mod changes;
pub mod components;
pub mod pending;
pub mod pool;
pub mod projects;
pub mod translations;
pub mod units;


use std::path::Path;
use tracing::{debug, info};

pub use pool::DbPool;

use crate::error::{FsError, StoreError, SyncResult};

/// Embedded migrations, applied in order.
const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial_schema",
    include_str!("migrations/0001_initial_schema.sql"),
)];

/// Opens the database and applies pending migrations.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the database cannot
/// be opened or a migration fails.
pub async fn initialize(db_path: &Path) -> SyncResult<DbPool> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;
    }

    let pool = pool::create_pool(db_path).await?;
    run_migrations(&pool).await?;
    debug!(path = %db_path.display(), "database ready");
    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> SyncResult<()> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )",
    )
    .execute(&mut *conn)
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: Option<(i64,)> = sqlx::query_as("SELECT id FROM _migrations WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        if applied.is_some() {
            continue;
        }

        info!(migration = %name, "applying migration");
        let mut tx = sqlx::Connection::begin(&mut *conn).await?;
        for statement in parse_sql_statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        }
        sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    Ok(())
}

/// Splits a migration file into statements.
///
/// `--` comments are dropped; semicolons inside parentheses do not end a
/// statement.
fn parse_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut depth: u32 = 0;

    for line in sql.lines() {
        let line = line.find("--").map_or(line, |idx| &line[..idx]);

        for ch in line.chars() {
            match ch {
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                ';' if depth == 0 => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            current.push(' ');
        }
    }

    let last = current.trim();
    if !last.is_empty() {
        statements.push(last.to_string());
    }
    statements
}

/// Current time as stored in timestamp columns.
pub(crate) fn now_micros() -> i64 {
    crate::models::to_micros(chrono::Utc::now())
}

/// Decodes a JSON text column.
pub(crate) fn json_column(entity: &'static str, text: &str) -> Result<serde_json::Value, StoreError> {
    serde_json::from_str(text).map_err(|e| StoreError::Corrupt {
        entity,
        message: e.to_string(),
    })
}

/// Parses a string-backed enum column.
pub(crate) fn enum_column<T>(entity: &'static str, text: &str) -> Result<T, StoreError>
where
    T: std::str::FromStr<Err = crate::error::ConfigError>,
{
    text.parse().map_err(|e: crate::error::ConfigError| StoreError::Corrupt {
        entity,
        message: e.to_string(),
    })
}
