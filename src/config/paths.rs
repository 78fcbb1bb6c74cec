// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path configuration.
//!
//! ```text
//! data/
//!   transync.sqlite3   (database)
//!   vcs/
//!     <project>/
//!       <component>/        (checkout)
//!       <component>.lock    (exclusive lock)
//! ```
//!
//! All paths are optional and resolved from `data` if not set.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Data directory (all other paths relative to this, default: `data`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    /// SQLite database file (default: `data/transync.sqlite3`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Root of the checkouts (default: `data/vcs`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs: Option<PathBuf>,
}

impl PathsConfig {
    /// Resolve relative paths against `data` and fill in defaults.
    pub fn resolve(&mut self) {
        let data = self
            .data
            .get_or_insert_with(|| PathBuf::from("data"))
            .clone();

        let resolve = |path: &mut Option<PathBuf>, default: &str| match path {
            Some(p) if p.is_relative() => {
                *path = Some(data.join(p.clone()));
            }
            None => {
                *path = Some(data.join(default));
            }
            _ => {}
        };

        resolve(&mut self.database, "transync.sqlite3");
        resolve(&mut self.vcs, "vcs");
    }

    /// Data directory.
    #[must_use]
    pub fn data(&self) -> &Path {
        self.data.as_deref().unwrap_or_else(|| Path::new("data"))
    }

    /// Database file.
    #[must_use]
    pub fn database(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| self.data().join("transync.sqlite3"))
    }

    /// Root of all checkouts.
    #[must_use]
    pub fn vcs_root(&self) -> PathBuf {
        self.vcs.clone().unwrap_or_else(|| self.data().join("vcs"))
    }

    /// Checkout directory of a component.
    #[must_use]
    pub fn checkout(&self, project: &str, component: &str) -> PathBuf {
        self.vcs_root().join(project).join(component)
    }
}
