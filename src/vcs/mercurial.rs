// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mercurial backend driven through the `hg` CLI.
//!
//! ```text
//! last_revision          hg log -r .        --template {node}
//! last_remote_revision   hg log -r max(public() and branch(<b>))
//! needs_merge            hg log -r "heads(branch(<b>)) - ."  (non-empty)
//! needs_push             hg log -r "draft()"                 (non-empty)
//! ```
//!
//! Extensions (purge, rebase) are enabled per command with `--config`.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use super::{
    FileList, MergeMode, RepositoryLockGuard, RevisionCache, VcsFuture, VersionControl,
    ensure_locked, format_author, run_vcs,
};
use crate::config::types::VcsConfig;
use crate::core::process::{ProcessBuilder, ProcessFlags};
use crate::error::{FsError, SyncResult, VcsError};
use crate::models::VcsKind;

/// A Mercurial checkout.
#[derive(Debug)]
pub struct HgRepository {
    path: PathBuf,
    branch: String,
    settings: Arc<VcsConfig>,
    cache: Mutex<RevisionCache>,
}

impl HgRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, branch: &str, settings: Arc<VcsConfig>) -> Self {
        Self {
            path: path.into(),
            branch: if branch.is_empty() {
                "default".to_string()
            } else {
                branch.to_string()
            },
            settings,
            cache: Mutex::new(RevisionCache::default()),
        }
    }

    fn hg(&self) -> ProcessBuilder {
        let mut builder = ProcessBuilder::new(&self.settings.hg)
            .cwd(&self.path)
            .env_var("HGPLAIN", "1")
            .env_var(
                "HGUSER",
                format!(
                    "{} <{}>",
                    self.settings.committer_name, self.settings.committer_email
                ),
            )
            .env_var("LC_ALL", "C")
            .args(["--config", "ui.interactive=false"])
            .capture_output();
        if self.settings.command_timeout > 0 {
            builder = builder.timeout(Duration::from_secs(self.settings.command_timeout));
        }
        builder
    }

    async fn execute(&self, args: &[&str]) -> SyncResult<String> {
        Ok(run_vcs(self.hg().args(args)).await?.into_stdout())
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, RevisionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn log_node(&self, revset: &str) -> SyncResult<String> {
        Ok(self
            .execute(&["log", "--rev", revset, "--template", "{node}\n"])
            .await?
            .lines()
            .last()
            .unwrap_or_default()
            .to_string())
    }

    async fn cached_head(&self) -> SyncResult<String> {
        if let Some(rev) = self.cache().local.clone() {
            return Ok(rev);
        }
        let rev = self.log_node(".").await?;
        self.cache().local = Some(rev.clone());
        Ok(rev)
    }

    async fn cached_remote(&self) -> SyncResult<String> {
        if let Some(rev) = self.cache().remote.clone() {
            return Ok(rev);
        }
        let revset = format!("max(public() and branch('{}'))", self.branch);
        let rev = self.log_node(&revset).await?;
        if rev.is_empty() {
            return Err(VcsError::BranchNotFound {
                branch: self.branch.clone(),
            }
            .into());
        }
        self.cache().remote = Some(rev.clone());
        Ok(rev)
    }

    async fn has_revisions(&self, revset: &str) -> SyncResult<bool> {
        Ok(!self.log_node(revset).await?.is_empty())
    }

    async fn clone_impl(&self, guard: &RepositoryLockGuard, url: &str) -> SyncResult<()> {
        ensure_locked(guard, &self.path)?;
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;
        run_vcs(
            self.hg()
                .cwd(parent)
                .flag(ProcessFlags::HIDE_ARGS)
                .args(["clone", "--updaterev"])
                .arg(&self.branch)
                .args(["--", url])
                .arg(&self.path),
        )
        .await?;
        self.invalidate_cache();
        info!(path = %self.path.display(), "repository cloned");
        Ok(())
    }

    async fn configure_impl(
        &self,
        guard: &RepositoryLockGuard,
        pull_url: &str,
        push_url: &str,
    ) -> SyncResult<()> {
        ensure_locked(guard, &self.path)?;
        let hgrc = self.path.join(".hg").join("hgrc");
        let existing = std::fs::read_to_string(&hgrc).unwrap_or_default();
        let mut kept: Vec<&str> = Vec::new();
        let mut in_paths = false;
        for line in existing.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('[') {
                in_paths = trimmed == "[paths]";
                if in_paths {
                    continue;
                }
            }
            if !in_paths {
                kept.push(line);
            }
        }
        let mut content = kept.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str("[paths]\n");
        content.push_str(&format!("default = {pull_url}\n"));
        if !push_url.is_empty() {
            content.push_str(&format!("default-push = {push_url}\n"));
        }
        crate::utility::fs::write_atomic(&hgrc, content.as_bytes())?;
        debug!(path = %hgrc.display(), "remote configured");
        Ok(())
    }

    async fn commit_impl(
        &self,
        guard: &RepositoryLockGuard,
        message: &str,
        author: &str,
        timestamp: DateTime<Utc>,
        files: &FileList,
    ) -> SyncResult<bool> {
        ensure_locked(guard, &self.path)?;
        if !self.needs_commit_impl(files).await? {
            return Ok(false);
        }
        let author = format_author(author, &self.settings.committer_email);
        let date = format!("{} 0", timestamp.timestamp());
        let mut args = vec![
            "commit",
            "--addremove",
            "--message",
            message,
            "--user",
            author.as_str(),
            "--date",
            date.as_str(),
        ];
        if !files.is_empty() {
            args.push("--");
            args.extend(files.iter().map(String::as_str));
        }
        self.execute(&args).await?;
        self.invalidate_cache();
        Ok(true)
    }

    async fn needs_commit_impl(&self, files: &FileList) -> SyncResult<bool> {
        let mut args = vec!["status", "--"];
        args.extend(files.iter().map(String::as_str));
        Ok(!self.execute(&args).await?.trim().is_empty())
    }

    async fn merge_impl(
        &self,
        guard: &RepositoryLockGuard,
        abort: bool,
        message: &str,
    ) -> SyncResult<()> {
        ensure_locked(guard, &self.path)?;
        if abort {
            self.execute(&["update", "--clean", "."]).await?;
        } else if self.needs_merge_impl().await? {
            let remote = self.cached_remote().await?;
            self.execute(&["merge", "--tool", "internal:fail", "--rev", &remote])
                .await?;
            let message = if message.is_empty() { "Merge" } else { message };
            let author = format_author("", &self.settings.committer_email);
            self.execute(&["commit", "--message", message, "--user", &author])
                .await?;
        }
        self.invalidate_cache();
        Ok(())
    }

    async fn needs_merge_impl(&self) -> SyncResult<bool> {
        let revset = format!("heads(branch('{}')) - ancestors(.)", self.branch);
        self.has_revisions(&revset).await
    }
}

impl VersionControl for HgRepository {
    fn kind(&self) -> VcsKind {
        VcsKind::Mercurial
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn is_valid(&self) -> bool {
        self.path.join(".hg").join("requires").exists()
    }

    fn last_revision(&self) -> VcsFuture<'_, String> {
        Box::pin(self.cached_head())
    }

    fn last_remote_revision(&self) -> VcsFuture<'_, String> {
        Box::pin(self.cached_remote())
    }

    fn invalidate_cache(&self) {
        *self.cache() = RevisionCache::default();
    }

    fn clone_from<'a>(&'a self, guard: &'a RepositoryLockGuard, url: &'a str) -> VcsFuture<'a, ()> {
        Box::pin(self.clone_impl(guard, url))
    }

    fn configure_remote<'a>(
        &'a self,
        guard: &'a RepositoryLockGuard,
        pull_url: &'a str,
        push_url: &'a str,
    ) -> VcsFuture<'a, ()> {
        Box::pin(self.configure_impl(guard, pull_url, push_url))
    }

    fn update_remote<'a>(&'a self, guard: &'a RepositoryLockGuard) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            self.execute(&["pull", "--branch", &self.branch]).await?;
            self.invalidate_cache();
            Ok(())
        })
    }

    fn needs_commit<'a>(&'a self, files: &'a FileList) -> VcsFuture<'a, bool> {
        Box::pin(self.needs_commit_impl(files))
    }

    fn needs_merge(&self) -> VcsFuture<'_, bool> {
        Box::pin(self.needs_merge_impl())
    }

    fn needs_push(&self) -> VcsFuture<'_, bool> {
        Box::pin(self.has_revisions("draft()"))
    }

    fn commit<'a>(
        &'a self,
        guard: &'a RepositoryLockGuard,
        message: &'a str,
        author: &'a str,
        timestamp: DateTime<Utc>,
        files: &'a FileList,
    ) -> VcsFuture<'a, bool> {
        Box::pin(self.commit_impl(guard, message, author, timestamp, files))
    }

    fn remove<'a>(
        &'a self,
        guard: &'a RepositoryLockGuard,
        files: &'a FileList,
        message: &'a str,
        author: &'a str,
    ) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            if files.is_empty() {
                return Ok(());
            }
            let mut args = vec!["remove", "--force", "--"];
            args.extend(files.iter().map(String::as_str));
            self.execute(&args).await?;
            self.commit_impl(guard, message, author, Utc::now(), &[])
                .await?;
            Ok(())
        })
    }

    fn forget<'a>(&'a self, guard: &'a RepositoryLockGuard, files: &'a FileList) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            if files.is_empty() {
                return Ok(());
            }
            let mut args = vec!["status", "--added", "--no-status", "--"];
            args.extend(files.iter().map(String::as_str));
            let added = self.execute(&args).await?;
            let mut args = vec!["forget", "--"];
            args.extend(added.lines().filter(|line| !line.is_empty()));
            if args.len() > 2 {
                self.execute(&args).await?;
            }
            Ok(())
        })
    }

    fn push<'a>(&'a self, guard: &'a RepositoryLockGuard, branch: &'a str) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            let branch = if branch.is_empty() { self.branch.as_str() } else { branch };
            // exit code 1 means nothing to push
            run_vcs(
                self.hg()
                    .args(["push", "--branch", branch])
                    .success_codes([0, 1]),
            )
            .await?;
            self.invalidate_cache();
            info!(path = %self.path.display(), branch, "pushed");
            Ok(())
        })
    }

    fn reset<'a>(&'a self, guard: &'a RepositoryLockGuard) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            let remote = self.cached_remote().await?;
            self.execute(&["update", "--clean", "--rev", &remote]).await?;
            if self.has_revisions("draft()").await? {
                self.execute(&["--config", "extensions.strip=", "strip", "--rev", "draft()"])
                    .await?;
            }
            self.invalidate_cache();
            Ok(())
        })
    }

    fn cleanup<'a>(&'a self, guard: &'a RepositoryLockGuard) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            self.execute(&["--config", "extensions.purge=", "purge"]).await?;
            Ok(())
        })
    }

    fn merge<'a>(
        &'a self,
        guard: &'a RepositoryLockGuard,
        abort: bool,
        _mode: MergeMode,
        message: &'a str,
    ) -> VcsFuture<'a, ()> {
        Box::pin(self.merge_impl(guard, abort, message))
    }

    fn rebase<'a>(&'a self, guard: &'a RepositoryLockGuard, abort: bool) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            if abort {
                self.execute(&["--config", "extensions.rebase=", "rebase", "--abort"])
                    .await?;
            } else if self.needs_merge_impl().await? {
                let remote = self.cached_remote().await?;
                self.execute(&[
                    "--config",
                    "extensions.rebase=",
                    "rebase",
                    "--tool",
                    "internal:fail",
                    "--dest",
                    &remote,
                ])
                .await?;
            }
            self.invalidate_cache();
            Ok(())
        })
    }

    fn status(&self) -> VcsFuture<'_, String> {
        Box::pin(async move {
            let summary = self.execute(&["summary"]).await?;
            Ok(summary.trim_end().to_string())
        })
    }
}
