// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Component configuration merging.
//!
//! ```text
//! ComponentConfig + ComponentConfigOverride --> field-by-field merge
//! ```
//!
//! Only explicitly set fields (`Some`) in override replace base values.

use serde::{Deserialize, Serialize};

use super::types::ComponentConfig;
use crate::models::{MergeStyle, NewLanguagePolicy, VcsKind};

/// Component configuration with optional fields for field-level merging.
///
/// All fields are optional to distinguish between "not set" (None) and
/// "explicitly set to value".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentConfigOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs: Option<VcsKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filemask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addon_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_style: Option<MergeStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_on_commit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_pending_age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_lang: Option<NewLanguagePolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_lock_error: Option<bool>,
}

/// Merge component-specific config over default config.
///
/// None values are ignored, allowing the base configuration to be used.
pub(super) fn merge_component_config(
    base: &ComponentConfig,
    over: &ComponentConfigOverride,
) -> ComponentConfig {
    let text = |value: &Option<String>, fallback: &String| {
        value.clone().unwrap_or_else(|| fallback.clone())
    };

    ComponentConfig {
        name: text(&over.name, &base.name),
        repo: text(&over.repo, &base.repo),
        push: text(&over.push, &base.push),
        branch: text(&over.branch, &base.branch),
        push_branch: text(&over.push_branch, &base.push_branch),
        vcs: over.vcs.unwrap_or(base.vcs),
        filemask: text(&over.filemask, &base.filemask),
        file_format: text(&over.file_format, &base.file_format),
        template: text(&over.template, &base.template),
        new_base: text(&over.new_base, &base.new_base),
        source_language: text(&over.source_language, &base.source_language),
        language_regex: text(&over.language_regex, &base.language_regex),
        commit_message: text(&over.commit_message, &base.commit_message),
        add_message: text(&over.add_message, &base.add_message),
        delete_message: text(&over.delete_message, &base.delete_message),
        merge_message: text(&over.merge_message, &base.merge_message),
        addon_message: text(&over.addon_message, &base.addon_message),
        merge_style: over.merge_style.unwrap_or(base.merge_style),
        push_on_commit: over.push_on_commit.unwrap_or(base.push_on_commit),
        commit_pending_age: over.commit_pending_age.unwrap_or(base.commit_pending_age),
        new_lang: over.new_lang.unwrap_or(base.new_lang),
        auto_lock_error: over.auto_lock_error.unwrap_or(base.auto_lock_error),
    }
}
