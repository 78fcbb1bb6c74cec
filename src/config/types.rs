// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for transync.
//!
//! # Config Structure
//!
//! ```text
//! Config: GlobalConfig, PathsConfig, VcsConfig, JobsConfig, ComponentConfig
//! Projects:   slug -> ProjectConfig
//! Components: "project/slug" -> ComponentConfigOverride
//! Aliases:    alias name -> [component patterns]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::logging::LogLevel;
use crate::models::{CommitPolicy, MergeStyle, NewLanguagePolicy, VcsKind};

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for stdout output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file.
    pub log_file: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: PathBuf::from("transync.log"),
        }
    }
}

/// Component aliases mapping alias names to component patterns.
pub type Aliases = BTreeMap<String, Vec<String>>;

/// Version control settings shared by every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VcsConfig {
    /// `git` executable.
    pub git: PathBuf,
    /// `hg` executable.
    pub hg: PathBuf,
    /// Seconds to wait for a checkout lock before giving up.
    pub lock_timeout: u64,
    /// Seconds after which a VCS command is killed (0 disables).
    pub command_timeout: u64,
    /// Committer name used for every commit.
    pub committer_name: String,
    /// Committer e-mail used for every commit.
    pub committer_email: String,
    /// Repository alerts after which an auto-lock component is locked.
    pub auto_lock_threshold: i64,
    /// GitHub REST API endpoint.
    pub github_api: String,
    /// GitHub account owning the forks.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub github_username: String,
    /// GitHub token.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub github_token: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            git: PathBuf::from("git"),
            hg: PathBuf::from("hg"),
            lock_timeout: 120,
            command_timeout: 0,
            committer_name: "Transync".to_string(),
            committer_email: "noreply@transync.invalid".to_string(),
            auto_lock_threshold: 3,
            github_api: "https://api.github.com".to_string(),
            github_username: String::new(),
            github_token: String::new(),
        }
    }
}

/// Background worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobsConfig {
    /// Maximum jobs running at once.
    pub workers: usize,
    /// Attempts for a job failing with a lock timeout.
    pub max_attempts: u32,
    /// Base delay in milliseconds of the exponential retry backoff.
    pub retry_delay_ms: u64,
    /// Days of audit log kept by the cleanup job.
    pub changes_retention_days: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_attempts: 5,
            retry_delay_ms: 1000,
            changes_retention_days: 90,
        }
    }
}

/// Project settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Display name (default: slug).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Which pending changes are committed.
    pub commit_policy: CommitPolicy,
}

/// Component settings.
///
/// `[component]` holds defaults; `[components."project/slug"]` overrides them
/// field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentConfig {
    /// Display name (default: slug).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Repository URL, or `link://project/component`.
    pub repo: String,
    /// Push URL (empty disables pushing for plain git).
    pub push: String,
    /// Branch to track.
    pub branch: String,
    /// Branch to push to (default: `branch`).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub push_branch: String,
    /// Version control backend.
    pub vcs: VcsKind,
    /// Translation file mask, `*` stands for the language code.
    pub filemask: String,
    /// File format id.
    pub file_format: String,
    /// Monolingual base file.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub template: String,
    /// Base file for new translations.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub new_base: String,
    /// Source language code.
    pub source_language: String,
    /// Languages to include.
    pub language_regex: String,
    /// Commit message template.
    pub commit_message: String,
    /// Message template for new translations.
    pub add_message: String,
    /// Message template for removed translations.
    pub delete_message: String,
    /// Message template for merge commits.
    pub merge_message: String,
    /// Message template for commits made by addons.
    pub addon_message: String,
    /// How upstream changes are integrated.
    pub merge_style: MergeStyle,
    /// Push after every commit.
    pub push_on_commit: bool,
    /// Hours after which pending changes are committed by the sweep.
    pub commit_pending_age: i64,
    /// New language policy.
    pub new_lang: NewLanguagePolicy,
    /// Lock the component after repeated repository alerts.
    pub auto_lock_error: bool,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            repo: String::new(),
            push: String::new(),
            branch: "main".to_string(),
            push_branch: String::new(),
            vcs: VcsKind::Git,
            filemask: String::new(),
            file_format: "po".to_string(),
            template: String::new(),
            new_base: String::new(),
            source_language: "en".to_string(),
            language_regex: "^[^.]+$".to_string(),
            commit_message: "Translated using Transync ({{ language_name }})\n\n\
                             Currently translated at {{ stats.translated_percent }}% \
                             ({{ stats.translated }} of {{ stats.all }} strings)\n\n\
                             Translation: {{ project_name }}/{{ component_name }}"
                .to_string(),
            add_message: "Added translation using Transync ({{ language_name }})".to_string(),
            delete_message: "Deleted translation using Transync ({{ language_name }})"
                .to_string(),
            merge_message: "Merge branch '{{ component_remote_branch }}' into Transync"
                .to_string(),
            addon_message: "Update translation files\n\n\
                            Updated by \"{{ addon_name }}\" add-on in Transync.\n\n\
                            Translation: {{ project_name }}/{{ component_name }}"
                .to_string(),
            merge_style: MergeStyle::Rebase,
            push_on_commit: true,
            commit_pending_age: 24,
            new_lang: NewLanguagePolicy::Add,
            auto_lock_error: true,
        }
    }
}
