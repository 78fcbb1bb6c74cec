// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Domain records shared by the store, synchronizer and addons.
//!
//! ```text
//! Project 1--* Component 1--* Translation 1--* Unit 1--* PendingUnitChange
//!                  |                |
//!                  +--* Alert <-----+      Change (audit log)
//!                  +--* AddonRecord
//!
//! UnitState:  0=empty  10=needs-editing  20=translated  30=approved  100=read-only
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::types::ComponentConfig;
use crate::error::{ConfigError, StoreError};

mod enums;

pub use enums::{
    AddonEvent, AddonScope, AlertKind, ChangeAction, CommitPolicy, MergeStyle, NewLanguagePolicy,
    UnitState, VcsKind,
};

#[cfg(test)]
mod tests;

/// Prefix of repository URLs that share another component's checkout.
pub const LINK_PREFIX: &str = "link://";

/// A group of components sharing a commit policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub commit_policy: CommitPolicy,
}

/// One tracked repository and file mask.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Component {
    pub id: i64,
    pub project_id: i64,
    pub project_slug: String,
    pub slug: String,
    pub name: String,
    pub settings: ComponentConfig,
    pub locked: bool,
}

impl Component {
    /// `project/component` path used in logs, config keys and links.
    #[must_use]
    pub fn full_slug(&self) -> String {
        format!("{}/{}", self.project_slug, self.slug)
    }

    /// Target of a `link://project/component` repository, if linked.
    #[must_use]
    pub fn linked_to(&self) -> Option<(&str, &str)> {
        parse_link(&self.settings.repo)
    }

    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.linked_to().is_some()
    }

    /// Whether the component has a separate template (monolingual format).
    #[must_use]
    pub fn has_template(&self) -> bool {
        !self.settings.template.is_empty()
    }

    /// Whether committed changes may be pushed upstream.
    #[must_use]
    pub fn can_push(&self) -> bool {
        !self.settings.push.is_empty()
            || matches!(self.settings.vcs, VcsKind::GitHub | VcsKind::Gerrit)
    }

    /// Remote branch to push to.
    #[must_use]
    pub fn push_branch(&self) -> &str {
        if self.settings.push_branch.is_empty() {
            &self.settings.branch
        } else {
            &self.settings.push_branch
        }
    }
}

/// Splits `link://project/component` into its parts.
#[must_use]
pub fn parse_link(repo: &str) -> Option<(&str, &str)> {
    let rest = repo.strip_prefix(LINK_PREFIX)?;
    let (project, component) = rest.split_once('/')?;
    if project.is_empty() || component.is_empty() || component.contains('/') {
        return None;
    }
    Some((project, component))
}

/// One (component, language) file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub id: i64,
    pub component_id: i64,
    pub language_code: String,
    pub filename: String,
    pub plural_count: i64,
    /// SHA-256 of the file content at the last successful parse.
    pub revision: String,
    pub is_source: bool,
}

/// One translatable string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    pub id: i64,
    pub translation_id: i64,
    pub id_hash: i64,
    pub context: String,
    pub source: String,
    pub target: String,
    pub state: UnitState,
    pub explanation: String,
    pub flags: String,
    pub position: i64,
    pub pending: bool,
}

/// Snapshot of an edit waiting to be written to the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingUnitChange {
    pub id: i64,
    pub unit_id: i64,
    pub author: String,
    pub target: String,
    pub state: UnitState,
    pub explanation: String,
    pub add_unit: bool,
    pub timestamp: DateTime<Utc>,
}

/// Audit log row.
#[derive(Debug, Clone, Serialize)]
pub struct Change {
    pub id: i64,
    pub action: ChangeAction,
    pub component_id: i64,
    pub translation_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub author: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Persistent problem attached to a component or translation.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: i64,
    pub component_id: i64,
    pub translation_id: Option<i64>,
    pub kind: AlertKind,
    /// What raised the alert within its kind, such as the addon name.
    pub subject: String,
    pub details: serde_json::Value,
    pub occurrences: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Installed addon instance.
#[derive(Debug, Clone, Serialize)]
pub struct AddonRecord {
    pub id: i64,
    pub name: String,
    pub scope: AddonScope,
    pub project_id: Option<i64>,
    pub component_id: Option<i64>,
    pub configuration: serde_json::Value,
    pub position: i64,
}

/// Content hash identifying a unit across translations.
///
/// Bilingual formats hash source and context, monolingual formats hash the key.
#[must_use]
pub fn id_hash(source: &str, context: &str) -> i64 {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0]);
    hasher.update(context.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(bytes)
}

/// Hex SHA-256 of file content, used as a translation revision.
#[must_use]
pub fn content_revision(content: &[u8]) -> String {
    use std::fmt::Write as _;

    let digest = Sha256::digest(content);
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Microseconds since the epoch, the storage form of timestamps.
#[must_use]
pub fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

/// Inverse of [`to_micros`].
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if the value is out of range.
pub fn from_micros(value: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(value).ok_or_else(|| StoreError::Corrupt {
        entity: "timestamp",
        message: format!("{value} is out of range"),
    })
}

/// Validates a slug: lowercase ASCII letters, digits, `-` and `_`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for an empty or malformed slug.
pub fn validate_slug(section: &str, slug: &str) -> Result<(), ConfigError> {
    let valid = !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: "slug".to_string(),
            message: format!("'{slug}' must use lowercase letters, digits, '-' or '_'"),
        })
    }
}
