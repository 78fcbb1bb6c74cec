// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git family backends.
//!
//! ```text
//! flavor       remote branch     update           push
//! plain        origin/<branch>   fetch origin     push origin HEAD:<branch>
//! gerrit       origin/<branch>   fetch origin     git review --yes <branch>
//! github       origin/<branch>   fetch origin     push fork + pull request
//! subversion   git-svn           svn fetch        svn dcommit
//! local        (none)            (none)           (none)
//! ```
//!
//! Reads use gix (no subprocess); writes use the git CLI with
//! `GIT_TERMINAL_PROMPT=0`, `GCM_INTERACTIVE=never` and the configured
//! committer identity.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::github::{GitHubClient, NewPullRequest, parse_github_url};
use super::{
    FileList, MergeMode, RepositoryLockGuard, RevisionCache, VcsFuture, VersionControl,
    ensure_locked, format_author, run_vcs,
};
use crate::config::types::VcsConfig;
use crate::core::process::{ProcessBuilder, ProcessFlags};
use crate::error::{FsError, GixError, SyncResult, VcsError};
use crate::models::VcsKind;

/// Which hosting workflow a git checkout follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitFlavor {
    Plain,
    Gerrit,
    GitHub,
    Subversion,
    Local,
}

impl GitFlavor {
    const fn kind(self) -> VcsKind {
        match self {
            Self::Plain => VcsKind::Git,
            Self::Gerrit => VcsKind::Gerrit,
            Self::GitHub => VcsKind::GitHub,
            Self::Subversion => VcsKind::Subversion,
            Self::Local => VcsKind::Local,
        }
    }

    const fn has_remote(self) -> bool {
        !matches!(self, Self::Local)
    }
}

/// Metadata of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionInfo {
    pub revision: String,
    pub author_name: String,
    pub author_email: String,
    pub author_date: DateTime<Utc>,
    /// First line of the message.
    pub summary: String,
    pub message: String,
}

impl RevisionInfo {
    /// `Name <email>` of the author.
    #[must_use]
    pub fn author(&self) -> String {
        format!("{} <{}>", self.author_name, self.author_email)
    }
}

/// A git checkout.
#[derive(Debug)]
pub struct GitRepository {
    path: PathBuf,
    flavor: GitFlavor,
    branch: String,
    settings: Arc<VcsConfig>,
    cache: Mutex<RevisionCache>,
}

impl GitRepository {
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        flavor: GitFlavor,
        branch: &str,
        settings: Arc<VcsConfig>,
    ) -> Self {
        Self {
            path: path.into(),
            flavor,
            branch: branch.to_string(),
            settings,
            cache: Mutex::new(RevisionCache::default()),
        }
    }

    #[must_use]
    pub const fn flavor(&self) -> GitFlavor {
        self.flavor
    }

    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Base command: git binary, checkout cwd, non-interactive environment.
    pub(crate) fn git(&self) -> ProcessBuilder {
        let mut builder = ProcessBuilder::new(&self.settings.git)
            .cwd(&self.path)
            .env_var("GIT_TERMINAL_PROMPT", "0")
            .env_var("GCM_INTERACTIVE", "never")
            .env_var("GIT_COMMITTER_NAME", &self.settings.committer_name)
            .env_var("GIT_COMMITTER_EMAIL", &self.settings.committer_email)
            .env_var("LC_ALL", "C")
            .capture_output();
        if self.settings.command_timeout > 0 {
            builder = builder.timeout(Duration::from_secs(self.settings.command_timeout));
        }
        builder
    }

    /// Runs git in the checkout and returns its stdout.
    pub(crate) async fn execute(&self, args: &[&str]) -> SyncResult<String> {
        Ok(run_vcs(self.git().args(args)).await?.into_stdout())
    }

    /// Runs git with arguments that may carry credentials, such as remote URLs.
    async fn execute_hidden(&self, args: &[&str]) -> SyncResult<String> {
        Ok(run_vcs(self.git().args(args).flag(ProcessFlags::HIDE_ARGS))
            .await?
            .into_stdout())
    }

    /// Runs git and returns its exit code, accepting `codes`.
    async fn execute_code(&self, args: &[&str], codes: [i32; 2]) -> SyncResult<i32> {
        Ok(run_vcs(self.git().args(args).success_codes(codes))
            .await?
            .exit_code())
    }

    fn fallback_email(&self) -> &str {
        &self.settings.committer_email
    }

    /// Remote-tracking ref of the upstream branch.
    #[must_use]
    pub fn remote_branch_name(&self) -> String {
        match self.flavor {
            GitFlavor::Subversion => "git-svn".to_string(),
            GitFlavor::Local => "HEAD".to_string(),
            _ => format!("origin/{}", self.branch),
        }
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, RevisionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve_head(&self) -> Result<String, VcsError> {
        let repo = gix::discover(&self.path).map_err(|e| GixError::Discover(Box::new(e)))?;
        let id = repo
            .head_id()
            .map_err(|e| GixError::Revision(e.to_string()))?;
        Ok(id.to_string())
    }

    fn resolve_ref(&self, spec: &str) -> Result<String, VcsError> {
        let repo = gix::discover(&self.path).map_err(|e| GixError::Discover(Box::new(e)))?;
        let id = repo
            .rev_parse_single(spec)
            .map_err(|_| VcsError::BranchNotFound {
                branch: spec.to_string(),
            })?;
        Ok(id.to_string())
    }

    async fn cached_head(&self) -> SyncResult<String> {
        if let Some(rev) = self.cache().local.clone() {
            return Ok(rev);
        }
        let rev = self.resolve_head()?;
        self.cache().local = Some(rev.clone());
        Ok(rev)
    }

    async fn cached_remote(&self) -> SyncResult<String> {
        if !self.flavor.has_remote() {
            return self.cached_head().await;
        }
        if let Some(rev) = self.cache().remote.clone() {
            return Ok(rev);
        }
        let rev = self.resolve_ref(&self.remote_branch_name())?;
        self.cache().remote = Some(rev.clone());
        Ok(rev)
    }

    async fn count_revisions(&self, range: &str) -> SyncResult<u64> {
        let out = self.execute(&["rev-list", "--count", range]).await?;
        out.trim()
            .parse()
            .map_err(|_| crate::error::SyncError::other(format!("unexpected rev-list output: {out}")))
    }

    /// Commit ids in `range`, oldest first, merges excluded.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::CommandFailed` if git rejects the range.
    pub async fn log_revisions(&self, range: &str) -> SyncResult<Vec<String>> {
        let out = self
            .execute(&["log", "--format=%H", "--reverse", "--no-merges", range])
            .await?;
        Ok(out.lines().map(str::to_string).collect())
    }

    /// Author, date and message of one commit.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::CommandFailed` for an unknown revision.
    pub async fn revision_info(&self, revision: &str) -> SyncResult<RevisionInfo> {
        let out = self
            .execute(&["log", "-1", "--format=%H%x00%an%x00%ae%x00%aI%x00%B", revision])
            .await?;
        parse_revision_info(&out).ok_or_else(|| {
            VcsError::BranchNotFound {
                branch: revision.to_string(),
            }
            .into()
        })
    }

    /// Trailers (`Key: value` lines) of a commit message.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::CommandFailed` for an unknown revision.
    pub async fn commit_trailers(&self, revision: &str) -> SyncResult<Vec<(String, String)>> {
        let out = self
            .execute(&["log", "-1", "--format=%(trailers:only,unfold)", revision])
            .await?;
        Ok(parse_trailers(&out))
    }

    /// Paths touched by a commit.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::CommandFailed` for an unknown revision.
    pub async fn changed_files(&self, revision: &str) -> SyncResult<Vec<String>> {
        let out = self
            .execute(&["diff-tree", "--no-commit-id", "--name-only", "-r", revision])
            .await?;
        Ok(out.lines().map(str::to_string).collect())
    }

    /// Whether anything is staged in the index.
    async fn has_staged_changes(&self) -> SyncResult<bool> {
        Ok(self
            .execute_code(&["diff", "--cached", "--quiet"], [0, 1])
            .await?
            == 1)
    }

    /// Commits the index with `message`; `false` if nothing is staged.
    pub(crate) async fn commit_staged(
        &self,
        message: &str,
        author: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> SyncResult<bool> {
        if !self.has_staged_changes().await? {
            return Ok(false);
        }
        let author = format_author(author, self.fallback_email());
        let mut builder = self
            .git()
            .args(["commit", "--quiet", "--file", "-", "--author"])
            .arg(&author)
            .stdin(message);
        if let Some(ts) = timestamp {
            builder = builder.arg("--date").arg(ts.to_rfc3339());
        }
        run_vcs(builder).await?;
        self.invalidate_cache();
        debug!(path = %self.path.display(), author = %author, "committed");
        Ok(true)
    }

    async fn stage_files(&self, files: &FileList) -> SyncResult<()> {
        if files.is_empty() {
            self.execute(&["add", "--all"]).await?;
            return Ok(());
        }
        let present: Vec<&str> = files
            .iter()
            .filter(|f| self.path.join(f).exists())
            .map(String::as_str)
            .collect();
        if present.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--all", "--force", "--"];
        args.extend(present);
        self.execute(&args).await?;
        Ok(())
    }

    async fn configure_origin(&self, pull_url: &str, push_url: &str) -> SyncResult<()> {
        let has_origin = self
            .execute_code(&["remote", "get-url", "origin"], [0, 2])
            .await?
            == 0;
        if has_origin {
            self.execute_hidden(&["remote", "set-url", "origin", pull_url]).await?;
        } else {
            self.execute_hidden(&["remote", "add", "origin", pull_url]).await?;
        }

        if push_url.is_empty() {
            self.execute_code(&["config", "--unset-all", "remote.origin.pushurl"], [0, 5])
                .await?;
        } else {
            self.execute_hidden(&["remote", "set-url", "--push", "origin", push_url])
                .await?;
        }

        let refspec = format!("+refs/heads/{0}:refs/remotes/origin/{0}", self.branch);
        self.execute(&["config", "remote.origin.fetch", &refspec])
            .await?;
        self.execute(&["config", &format!("branch.{}.remote", self.branch), "origin"])
            .await?;
        self.execute(&[
            "config",
            &format!("branch.{}.merge", self.branch),
            &format!("refs/heads/{}", self.branch),
        ])
        .await?;
        Ok(())
    }

    async fn push_github(&self, branch: &str) -> SyncResult<()> {
        let origin = self.execute(&["remote", "get-url", "origin"]).await?;
        let (owner, repo) = parse_github_url(origin.trim()).ok_or_else(|| VcsError::PullRequest {
            message: format!("not a GitHub URL: {}", origin.trim()),
        })?;
        let client = GitHubClient::new(&self.settings.github_api, &self.settings.github_token);
        let fork = client.create_fork(&owner, &repo).await?;

        let fork_branch = format!("transync-{}", self.path.file_name().map_or_else(
            || "update".to_string(),
            |n| n.to_string_lossy().into_owned(),
        ));
        let has_fork = self
            .execute_code(&["remote", "get-url", "fork"], [0, 2])
            .await?
            == 0;
        let action = if has_fork { "set-url" } else { "add" };
        self.execute_hidden(&["remote", action, "fork", &fork.clone_url])
            .await?;
        run_vcs(
            self.git()
                .args(["push", "--force", "fork"])
                .arg(format!("HEAD:refs/heads/{fork_branch}")),
        )
        .await?;

        let summary = self.revision_info("HEAD").await.map(|i| i.summary).unwrap_or_default();
        let head_owner = fork
            .full_name
            .split_once('/')
            .map_or(self.settings.github_username.as_str(), |(o, _)| o);
        let request = NewPullRequest {
            title: if summary.is_empty() {
                "Translations update".to_string()
            } else {
                summary
            },
            head: format!("{head_owner}:{fork_branch}"),
            base: branch.to_string(),
            body: "Translations update from Transync.".to_string(),
        };
        client.create_pull_request(&owner, &repo, &request).await?;
        Ok(())
    }

    async fn push_impl(&self, guard: &RepositoryLockGuard, branch: &str) -> SyncResult<()> {
        ensure_locked(guard, &self.path)?;
        let branch = if branch.is_empty() { self.branch.as_str() } else { branch };
        match self.flavor {
            GitFlavor::Local => {
                debug!(path = %self.path.display(), "local repository, nothing to push");
            }
            GitFlavor::Plain => {
                run_vcs(
                    self.git()
                        .args(["push", "origin"])
                        .arg(format!("HEAD:refs/heads/{branch}")),
                )
                .await?;
            }
            GitFlavor::Gerrit => {
                self.execute(&["review", "--yes", branch]).await?;
            }
            GitFlavor::GitHub => self.push_github(branch).await?,
            GitFlavor::Subversion => {
                self.execute(&["svn", "dcommit"]).await?;
            }
        }
        self.invalidate_cache();
        info!(path = %self.path.display(), branch, "pushed");
        Ok(())
    }

    async fn clone_impl(&self, guard: &RepositoryLockGuard, url: &str) -> SyncResult<()> {
        ensure_locked(guard, &self.path)?;
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;

        let target = self.path.display().to_string();
        let builder = self.git().cwd(parent).flag(ProcessFlags::HIDE_ARGS);
        let builder = match self.flavor {
            GitFlavor::Local => builder.args(["init", "--quiet", "--initial-branch"]).arg(&self.branch).arg(&target),
            GitFlavor::Subversion => builder.args(["svn", "clone", "--quiet", url]).arg(&target),
            _ => builder
                .args(["clone", "--quiet", "--branch"])
                .arg(&self.branch)
                .args(["--", url])
                .arg(&target),
        };
        run_vcs(builder).await?;
        self.invalidate_cache();
        info!(path = %self.path.display(), "repository cloned");
        Ok(())
    }

    async fn merge_impl(
        &self,
        guard: &RepositoryLockGuard,
        abort: bool,
        mode: MergeMode,
        message: &str,
    ) -> SyncResult<()> {
        ensure_locked(guard, &self.path)?;
        if abort {
            self.execute(&["merge", "--abort"]).await?;
        } else {
            match self.flavor {
                GitFlavor::Local => return Ok(()),
                GitFlavor::Subversion => {
                    self.execute(&["svn", "rebase"]).await?;
                }
                _ => {
                    let remote = self.remote_branch_name();
                    let mut args = vec!["merge", "--no-edit"];
                    if mode == MergeMode::MergeNoFf {
                        args.push("--no-ff");
                    }
                    if !message.is_empty() {
                        args.extend(["-m", message]);
                    }
                    args.push(&remote);
                    self.execute(&args).await?;
                }
            }
        }
        self.invalidate_cache();
        Ok(())
    }

    async fn rebase_impl(&self, guard: &RepositoryLockGuard, abort: bool) -> SyncResult<()> {
        ensure_locked(guard, &self.path)?;
        if abort {
            self.execute(&["rebase", "--abort"]).await?;
        } else {
            match self.flavor {
                GitFlavor::Local => return Ok(()),
                GitFlavor::Subversion => {
                    self.execute(&["svn", "rebase"]).await?;
                }
                _ => {
                    let remote = self.remote_branch_name();
                    self.execute(&["rebase", &remote]).await?;
                }
            }
        }
        self.invalidate_cache();
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
        self.stage_files(files).await?;
        self.commit_staged(message, author, Some(timestamp)).await
    }

    async fn remove_impl(
        &self,
        guard: &RepositoryLockGuard,
        files: &FileList,
        message: &str,
        author: &str,
    ) -> SyncResult<()> {
        ensure_locked(guard, &self.path)?;
        if files.is_empty() {
            return Ok(());
        }
        let mut args = vec!["rm", "-r", "--force", "--quiet", "--ignore-unmatch", "--"];
        args.extend(files.iter().map(String::as_str));
        self.execute(&args).await?;
        self.commit_staged(message, author, None).await?;
        Ok(())
    }

    async fn needs_commit_impl(&self, files: &FileList) -> SyncResult<bool> {
        let mut args = vec!["status", "--porcelain", "--untracked-files=all", "--"];
        args.extend(files.iter().map(String::as_str));
        Ok(!self.execute(&args).await?.trim().is_empty())
    }

    async fn needs_merge_impl(&self) -> SyncResult<bool> {
        if !self.flavor.has_remote() {
            return Ok(false);
        }
        let remote = self.remote_branch_name();
        if self.resolve_ref(&remote).is_err() {
            return Ok(false);
        }
        Ok(self.count_revisions(&format!("HEAD..{remote}")).await? > 0)
    }

    async fn needs_push_impl(&self) -> SyncResult<bool> {
        if !self.flavor.has_remote() {
            return Ok(false);
        }
        let remote = self.remote_branch_name();
        if self.resolve_ref(&remote).is_err() {
            warn!(path = %self.path.display(), remote = %remote, "remote branch missing");
            return Ok(true);
        }
        Ok(self.count_revisions(&format!("{remote}..HEAD")).await? > 0)
    }

    async fn status_impl(&self) -> SyncResult<String> {
        let status = self.execute(&["status"]).await?;
        Ok(status.trim_end().to_string())
    }
}

impl VersionControl for GitRepository {
    fn kind(&self) -> VcsKind {
        self.flavor.kind()
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn is_valid(&self) -> bool {
        self.path.join(".git").exists() && gix::open(&self.path).is_ok()
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
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            if matches!(self.flavor, GitFlavor::Local | GitFlavor::Subversion) {
                return Ok(());
            }
            self.configure_origin(pull_url, push_url).await
        })
    }

    fn update_remote<'a>(&'a self, guard: &'a RepositoryLockGuard) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            match self.flavor {
                GitFlavor::Local => {}
                GitFlavor::Subversion => {
                    self.execute(&["svn", "fetch"]).await?;
                }
                _ => {
                    self.execute(&["fetch", "--quiet", "origin"]).await?;
                }
            }
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
        Box::pin(self.needs_push_impl())
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
        Box::pin(self.remove_impl(guard, files, message, author))
    }

    fn forget<'a>(&'a self, guard: &'a RepositoryLockGuard, files: &'a FileList) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            if files.is_empty() {
                return Ok(());
            }
            let mut args = vec!["reset", "--quiet", "--"];
            args.extend(files.iter().map(String::as_str));
            self.execute(&args).await?;
            Ok(())
        })
    }

    fn push<'a>(&'a self, guard: &'a RepositoryLockGuard, branch: &'a str) -> VcsFuture<'a, ()> {
        Box::pin(self.push_impl(guard, branch))
    }

    fn reset<'a>(&'a self, guard: &'a RepositoryLockGuard) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            let remote = self.remote_branch_name();
            self.execute(&["reset", "--hard", &remote]).await?;
            self.invalidate_cache();
            Ok(())
        })
    }

    fn cleanup<'a>(&'a self, guard: &'a RepositoryLockGuard) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            ensure_locked(guard, &self.path)?;
            for state in ["rebase-merge", "rebase-apply"] {
                if self.path.join(".git").join(state).exists() {
                    self.execute(&["rebase", "--abort"]).await?;
                }
            }
            if self.path.join(".git/MERGE_HEAD").exists() {
                self.execute(&["merge", "--abort"]).await?;
            }
            self.execute(&["clean", "-f", "-d"]).await?;
            self.invalidate_cache();
            Ok(())
        })
    }

    fn merge<'a>(
        &'a self,
        guard: &'a RepositoryLockGuard,
        abort: bool,
        mode: MergeMode,
        message: &'a str,
    ) -> VcsFuture<'a, ()> {
        Box::pin(self.merge_impl(guard, abort, mode, message))
    }

    fn rebase<'a>(&'a self, guard: &'a RepositoryLockGuard, abort: bool) -> VcsFuture<'a, ()> {
        Box::pin(self.rebase_impl(guard, abort))
    }

    fn status(&self) -> VcsFuture<'_, String> {
        Box::pin(self.status_impl())
    }

    fn as_git(&self) -> Option<&GitRepository> {
        Some(self)
    }
}

/// Parses `%H%x00%an%x00%ae%x00%aI%x00%B` output.
pub(crate) fn parse_revision_info(out: &str) -> Option<RevisionInfo> {
    let mut parts = out.splitn(5, '\0');
    let revision = parts.next()?.trim().to_string();
    let author_name = parts.next()?.to_string();
    let author_email = parts.next()?.to_string();
    let author_date = DateTime::parse_from_rfc3339(parts.next()?.trim())
        .ok()?
        .with_timezone(&Utc);
    let message = parts.next().unwrap_or_default().trim().to_string();
    let summary = message.lines().next().unwrap_or_default().to_string();
    Some(RevisionInfo {
        revision,
        author_name,
        author_email,
        author_date,
        summary,
        message,
    })
}

/// Parses `Key: value` trailer lines.
pub(crate) fn parse_trailers(out: &str) -> Vec<(String, String)> {
    out.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            if key.is_empty() || key.contains(' ') {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}
