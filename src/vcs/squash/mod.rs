// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! History rewriting of not-yet-pushed commits.
//!
//! ```text
//! base = merge-base(HEAD, remote)       commits = base..HEAD (oldest first)
//!
//! squash_all        base <- one commit (Co-authored-by trailers)
//! squash_author     base <- cherry-pick group(author A) <- group(author B) ...
//!                   conflict -> abort, reset to old tip, fold adjacent runs only
//! squash_language   base <- one commit per language (files grouped by key)
//! squash_file       base <- one commit per file
//! ```
//!
//! Authorship of a squashed commit is the author of its first commit, the
//! date is the date of its last commit.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::git::{GitRepository, RevisionInfo};
use super::{RepositoryLockGuard, VersionControl, ensure_locked, run_vcs};
use crate::error::SyncResult;

/// Commits folded into one.
#[derive(Debug, Clone)]
struct Group {
    commits: Vec<RevisionInfo>,
}

impl Group {
    fn author(&self) -> String {
        self.commits.first().map(RevisionInfo::author).unwrap_or_default()
    }

    fn message(&self) -> String {
        let mut seen: Vec<&str> = Vec::new();
        for commit in &self.commits {
            if !seen.contains(&commit.message.as_str()) {
                seen.push(&commit.message);
            }
        }
        seen.join("\n\n")
    }
}

/// Groups by author in order of first appearance.
fn group_by_author(commits: &[RevisionInfo]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for commit in commits {
        match groups
            .iter_mut()
            .find(|g| g.commits[0].author_email == commit.author_email)
        {
            Some(group) => group.commits.push(commit.clone()),
            None => groups.push(Group {
                commits: vec![commit.clone()],
            }),
        }
    }
    groups
}

/// Groups adjacent commits of the same author.
fn group_adjacent(commits: &[RevisionInfo]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for commit in commits {
        match groups.last_mut() {
            Some(group) if group.commits[0].author_email == commit.author_email => {
                group.commits.push(commit.clone());
            }
            _ => groups.push(Group {
                commits: vec![commit.clone()],
            }),
        }
    }
    groups
}

/// `Co-authored-by` trailers for every author but the first.
fn co_author_trailers(commits: &[RevisionInfo]) -> Vec<String> {
    let first = commits.first().map(|c| c.author_email.as_str());
    let mut trailers: Vec<String> = Vec::new();
    for commit in commits {
        if Some(commit.author_email.as_str()) == first {
            continue;
        }
        let trailer = format!("Co-authored-by: {}", commit.author());
        if !trailers.contains(&trailer) {
            trailers.push(trailer);
        }
    }
    trailers
}

impl GitRepository {
    /// Common ancestor of HEAD and the remote branch.
    async fn squash_base(&self) -> SyncResult<String> {
        let remote = self.remote_branch_name();
        let out = self.execute(&["merge-base", "HEAD", &remote]).await?;
        Ok(out.trim().to_string())
    }

    async fn pending_commits(&self, base: &str) -> SyncResult<Vec<RevisionInfo>> {
        let mut commits = Vec::new();
        for revision in self.log_revisions(&format!("{base}..HEAD")).await? {
            commits.push(self.revision_info(&revision).await?);
        }
        Ok(commits)
    }

    async fn head(&self) -> SyncResult<String> {
        Ok(self.execute(&["rev-parse", "HEAD"]).await?.trim().to_string())
    }

    /// Replays `groups` on top of `base`, one commit per group.
    ///
    /// Leaves the checkout at `tip` and returns `false` on a cherry-pick conflict.
    async fn replay_groups(&self, base: &str, tip: &str, groups: &[Group]) -> SyncResult<bool> {
        self.execute(&["reset", "--hard", base]).await?;
        for group in groups {
            let before = self.head().await?;
            let mut args = vec!["cherry-pick", "--allow-empty", "--keep-redundant-commits"];
            args.extend(group.commits.iter().map(|c| c.revision.as_str()));
            if let Err(e) = self.execute(&args).await {
                warn!(path = %self.path().display(), error = %e, "cherry-pick conflict while squashing");
                let _ = run_vcs(self.git().args(["cherry-pick", "--abort"])).await;
                self.execute(&["reset", "--hard", tip]).await?;
                self.invalidate_cache();
                return Ok(false);
            }
            self.execute(&["reset", "--soft", &before]).await?;
            let date = group.commits.last().map(|c| c.author_date);
            self.commit_staged(&group.message(), &group.author(), date)
                .await?;
        }
        self.invalidate_cache();
        Ok(true)
    }

    /// Folds commits of each author into one, at most one commit per author.
    ///
    /// Falls back to folding only adjacent same-author commits when
    /// reordering conflicts.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::LockNotHeld` without the lock, or a command failure.
    pub async fn squash_author(&self, guard: &RepositoryLockGuard) -> SyncResult<()> {
        ensure_locked(guard, self.path())?;
        let base = self.squash_base().await?;
        let commits = self.pending_commits(&base).await?;
        if commits.len() < 2 {
            return Ok(());
        }
        let tip = self.head().await?;

        let groups = group_by_author(&commits);
        if groups.len() == commits.len() {
            return Ok(());
        }
        if self.replay_groups(&base, &tip, &groups).await? {
            info!(path = %self.path().display(), commits = commits.len(), authors = groups.len(), "squashed by author");
            return Ok(());
        }

        let adjacent = group_adjacent(&commits);
        if !self.replay_groups(&base, &tip, &adjacent).await? {
            warn!(path = %self.path().display(), "squash left history untouched");
            return Ok(());
        }
        info!(path = %self.path().display(), commits = commits.len(), groups = adjacent.len(), "squashed adjacent commits");
        Ok(())
    }

    /// Folds every pending commit into one, crediting other authors in trailers.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::LockNotHeld` without the lock, or a command failure.
    pub async fn squash_all(&self, guard: &RepositoryLockGuard) -> SyncResult<()> {
        ensure_locked(guard, self.path())?;
        let base = self.squash_base().await?;
        let commits = self.pending_commits(&base).await?;
        if commits.len() < 2 {
            return Ok(());
        }
        let group = Group { commits };
        let mut message = group.message();
        let trailers = co_author_trailers(&group.commits);
        if !trailers.is_empty() {
            message.push_str("\n\n");
            message.push_str(&trailers.join("\n"));
        }
        self.execute(&["reset", "--soft", &base]).await?;
        let date = group.commits.last().map(|c| c.author_date);
        self.commit_staged(&message, &group.author(), date).await?;
        self.invalidate_cache();
        info!(path = %self.path().display(), commits = group.commits.len(), "squashed all commits");
        Ok(())
    }

    /// One commit per key of the changed paths.
    ///
    /// `key` maps a repository-relative path to its group, for example the
    /// language the file belongs to. Each commit carries the messages and the
    /// first author of the commits that touched its files.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::LockNotHeld` without the lock, or a command failure.
    pub async fn squash_paths<F>(&self, guard: &RepositoryLockGuard, key: F) -> SyncResult<()>
    where
        F: Fn(&str) -> String + Send + Sync,
    {
        ensure_locked(guard, self.path())?;
        let base = self.squash_base().await?;
        let commits = self.pending_commits(&base).await?;
        if commits.len() < 2 {
            return Ok(());
        }

        let mut groups: BTreeMap<String, (Vec<String>, Vec<RevisionInfo>)> = BTreeMap::new();
        for commit in &commits {
            for file in self.changed_files(&commit.revision).await? {
                let entry = groups.entry(key(&file)).or_default();
                if !entry.0.contains(&file) {
                    entry.0.push(file);
                }
                if !entry.1.iter().any(|c| c.revision == commit.revision) {
                    entry.1.push(commit.clone());
                }
            }
        }

        self.execute(&["reset", "--mixed", "--quiet", &base]).await?;
        for (name, (files, commits)) in &groups {
            let mut args = vec!["add", "--all", "--force", "--"];
            args.extend(files.iter().map(String::as_str));
            self.execute(&args).await?;
            let group = Group {
                commits: commits.clone(),
            };
            let date = group.commits.last().map(|c| c.author_date);
            let committed = self
                .commit_staged(&group.message(), &group.author(), date)
                .await?;
            debug!(group = %name, files = files.len(), committed, "squashed group");
        }
        self.invalidate_cache();
        info!(path = %self.path().display(), commits = commits.len(), groups = groups.len(), "squashed by path");
        Ok(())
    }

    /// One commit per changed file.
    ///
    /// # Errors
    ///
    /// Same as [`Self::squash_paths`].
    pub async fn squash_file(&self, guard: &RepositoryLockGuard) -> SyncResult<()> {
        self.squash_paths(guard, str::to_string).await
    }
}

#[cfg(test)]
mod tests;
