// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Version control adapters.
//!
//! ```text
//!              open_repository(kind)
//!                      |
//!       +--------------+---------------+
//!       v                              v
//!  GitRepository                  HgRepository
//!  flavor: plain | gerrit |       hg CLI
//!    github | subversion | local
//!   gix (read)  git CLI (write)
//!       |
//!       +-- squash: author / all / language / file
//!       +-- github: fork + pull request (reqwest)
//!
//! Mutating calls take &RepositoryLockGuard and fail with
//! VcsError::LockNotHeld unless the guard covers the checkout.
//! ```

pub mod git;
pub mod github;
pub mod lock;
pub mod mercurial;
mod squash;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use git::{GitFlavor, GitRepository, RevisionInfo};
pub use lock::{RepositoryLock, RepositoryLockGuard};
pub use mercurial::HgRepository;

use crate::config::types::VcsConfig;
use crate::error::{SyncResult, VcsError};
use crate::models::VcsKind;

/// Future returned by [`VersionControl`] methods.
pub type VcsFuture<'a, T> = BoxFuture<'a, SyncResult<T>>;

/// Files selected for a commit; empty means every change in the checkout.
pub type FileList = [String];

/// How upstream changes are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Fast-forward when possible.
    Merge,
    /// Always create a merge commit.
    MergeNoFf,
}

/// One checkout driven through its version control binary.
pub trait VersionControl: Send + Sync {
    fn kind(&self) -> VcsKind;

    /// Checkout directory.
    fn path(&self) -> &Path;

    /// Whether the checkout exists and is a repository of this kind.
    fn is_valid(&self) -> bool;

    /// Revision of the working copy, cached until a mutating call.
    fn last_revision(&self) -> VcsFuture<'_, String>;

    /// Revision of the tracked remote branch, cached until a mutating call.
    fn last_remote_revision(&self) -> VcsFuture<'_, String>;

    /// Drops cached revisions.
    fn invalidate_cache(&self);

    /// Creates the checkout from `url`.
    fn clone_from<'a>(&'a self, guard: &'a RepositoryLockGuard, url: &'a str) -> VcsFuture<'a, ()>;

    /// Points the checkout at the given pull and push URLs and branch.
    fn configure_remote<'a>(
        &'a self,
        guard: &'a RepositoryLockGuard,
        pull_url: &'a str,
        push_url: &'a str,
    ) -> VcsFuture<'a, ()>;

    /// Fetches from the remote without touching the working copy.
    fn update_remote<'a>(&'a self, guard: &'a RepositoryLockGuard) -> VcsFuture<'a, ()>;

    /// Whether `files` (or the whole checkout) have uncommitted changes.
    fn needs_commit<'a>(&'a self, files: &'a FileList) -> VcsFuture<'a, bool>;

    /// Whether the remote has commits missing locally.
    fn needs_merge(&self) -> VcsFuture<'_, bool>;

    /// Whether local commits are missing upstream.
    fn needs_push(&self) -> VcsFuture<'_, bool>;

    /// Commits `files` (or everything); returns `false` when nothing changed.
    fn commit<'a>(
        &'a self,
        guard: &'a RepositoryLockGuard,
        message: &'a str,
        author: &'a str,
        timestamp: DateTime<Utc>,
        files: &'a FileList,
    ) -> VcsFuture<'a, bool>;

    /// Removes `files` and commits the removal.
    fn remove<'a>(
        &'a self,
        guard: &'a RepositoryLockGuard,
        files: &'a FileList,
        message: &'a str,
        author: &'a str,
    ) -> VcsFuture<'a, ()>;

    /// Unstages `files` so the next commit leaves them out; the working
    /// copy is untouched.
    fn forget<'a>(&'a self, guard: &'a RepositoryLockGuard, files: &'a FileList) -> VcsFuture<'a, ()>;

    /// Publishes local commits to `branch`.
    fn push<'a>(&'a self, guard: &'a RepositoryLockGuard, branch: &'a str) -> VcsFuture<'a, ()>;

    /// Discards local commits and changes, matching the remote branch.
    fn reset<'a>(&'a self, guard: &'a RepositoryLockGuard) -> VcsFuture<'a, ()>;

    /// Removes untracked files and leftovers of interrupted operations.
    fn cleanup<'a>(&'a self, guard: &'a RepositoryLockGuard) -> VcsFuture<'a, ()>;

    /// Merges the remote branch, or aborts an in-progress merge.
    fn merge<'a>(
        &'a self,
        guard: &'a RepositoryLockGuard,
        abort: bool,
        mode: MergeMode,
        message: &'a str,
    ) -> VcsFuture<'a, ()>;

    /// Rebases on the remote branch, or aborts an in-progress rebase.
    fn rebase<'a>(&'a self, guard: &'a RepositoryLockGuard, abort: bool) -> VcsFuture<'a, ()>;

    /// Human readable status of the checkout.
    fn status(&self) -> VcsFuture<'_, String>;

    /// Git specific operations, if the backend is git based.
    fn as_git(&self) -> Option<&GitRepository> {
        None
    }
}

/// Fails with `LockNotHeld` unless `guard` protects `path`.
///
/// # Errors
///
/// Returns `VcsError::LockNotHeld` for a guard of another checkout.
pub fn ensure_locked(guard: &RepositoryLockGuard, path: &Path) -> Result<(), VcsError> {
    if guard.covers(path) {
        Ok(())
    } else {
        Err(VcsError::LockNotHeld {
            path: path.display().to_string(),
        })
    }
}

/// Opens the adapter for a checkout.
#[must_use]
pub fn open_repository(
    kind: VcsKind,
    path: impl Into<PathBuf>,
    branch: &str,
    settings: Arc<VcsConfig>,
) -> Box<dyn VersionControl> {
    let path = path.into();
    match kind {
        VcsKind::Mercurial => Box::new(HgRepository::new(path, branch, settings)),
        VcsKind::Git => Box::new(GitRepository::new(path, GitFlavor::Plain, branch, settings)),
        VcsKind::Gerrit => Box::new(GitRepository::new(path, GitFlavor::Gerrit, branch, settings)),
        VcsKind::GitHub => Box::new(GitRepository::new(path, GitFlavor::GitHub, branch, settings)),
        VcsKind::Subversion => Box::new(GitRepository::new(
            path,
            GitFlavor::Subversion,
            branch,
            settings,
        )),
        VcsKind::Local => Box::new(GitRepository::new(path, GitFlavor::Local, branch, settings)),
    }
}

/// `Name <email>` form expected by `--author`.
#[must_use]
pub fn format_author(author: &str, fallback_email: &str) -> String {
    let author = author.trim();
    if author.contains('<') && author.ends_with('>') {
        author.to_string()
    } else if author.is_empty() {
        format!("Anonymous <{fallback_email}>")
    } else if author.contains('@') && !author.contains(' ') {
        format!("{author} <{author}>")
    } else {
        format!("{author} <{fallback_email}>")
    }
}

/// Revision cache shared by the backends.
#[derive(Debug, Default)]
struct RevisionCache {
    local: Option<String>,
    remote: Option<String>,
}

/// Runs a VCS command, turning a non-zero exit into `VcsError::CommandFailed`.
pub(crate) async fn run_vcs(
    builder: crate::core::process::ProcessBuilder,
) -> SyncResult<crate::core::process::ProcessOutput> {
    use crate::error::ProcessError;

    match builder.run().await {
        Ok(output) => Ok(output),
        Err(ProcessError::NonZeroExit {
            command,
            code,
            stdout,
            stderr,
        }) => Err(VcsError::CommandFailed {
            command,
            retcode: code,
            stdout,
            stderr,
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}
