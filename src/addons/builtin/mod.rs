// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Built-in addons.
//!
//! ```text
//! discovery.discovery   post-update        create components from a match regex
//! git.squash            pre-push           squash commits (all/author/language/file)
//! gettext.linguas       post-add, daily    keep LINGUAS in sync with translations
//! gettext.msgmerge      post-update        msgmerge translations with the POT
//! gettext.mo            pre-commit         compile MO files next to PO files
//! json.customize        pre-commit         key order and indentation of JSON
//! properties.sort       pre-commit         sort Java properties by key
//! cleanup.generic       pre-commit,        drop keys missing from the template
//!                       post-update
//! flags.target_edit     unit-pre-create    new translated units need editing
//! ```

mod cleanup;
mod discovery;
mod flags;
mod gettext;
mod git;
mod json;
mod properties;

pub use gettext::update_linguas;
pub use git::SquashMode;

use super::{AddonFactory, AddonMetadata};

/// Every built-in addon with its factory.
pub static ALL: &[(&AddonMetadata, AddonFactory)] = &[
    (&discovery::METADATA, discovery::create),
    (&git::METADATA, git::create),
    (&gettext::LINGUAS, gettext::create_linguas),
    (&gettext::MSGMERGE, gettext::create_msgmerge),
    (&gettext::MO, gettext::create_mo),
    (&json::METADATA, json::create),
    (&properties::METADATA, properties::create),
    (&cleanup::METADATA, cleanup::create),
    (&flags::METADATA, flags::create),
];

/// Scopes of addons that work on any component they are attached to.
const ALL_SCOPES: &[crate::models::AddonScope] = &[
    crate::models::AddonScope::Component,
    crate::models::AddonScope::Project,
    crate::models::AddonScope::Site,
];

/// Configuration of addons without settings; only `null` and `{}` pass.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct NoConfig {}

/// Configuration as JSON, for storage.
fn to_configuration<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
