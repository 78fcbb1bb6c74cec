// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use super::git::{parse_revision_info, parse_trailers};
use super::github::parse_github_url;
use super::*;
use crate::error::{LockError, SyncError, VcsError};

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Runs git with a fixed identity, panicking on failure.
fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Seed")
        .env("GIT_AUTHOR_EMAIL", "seed@example.com")
        .env("GIT_COMMITTER_NAME", "Seed")
        .env("GIT_COMMITTER_EMAIL", "seed@example.com")
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Creates a bare upstream on branch `main` holding `po/de.po` and `po/cs.po`.
fn init_upstream(root: &Path) -> String {
    let seed = root.join("seed");
    std::fs::create_dir_all(seed.join("po")).unwrap();
    git(&seed, &["init", "--quiet", "--initial-branch", "main"]);
    std::fs::write(seed.join("po/de.po"), "msgid \"a\"\nmsgstr \"\"\n").unwrap();
    std::fs::write(seed.join("po/cs.po"), "msgid \"a\"\nmsgstr \"\"\n").unwrap();
    git(&seed, &["add", "."]);
    git(&seed, &["commit", "--quiet", "-m", "Initial commit"]);
    let upstream = root.join("upstream.git");
    git(
        root,
        &["clone", "--quiet", "--bare", "seed", "upstream.git"],
    );
    upstream.display().to_string()
}

fn settings() -> Arc<VcsConfig> {
    Arc::new(VcsConfig {
        committer_name: "Transync".to_string(),
        committer_email: "transync@example.com".to_string(),
        ..VcsConfig::default()
    })
}

struct Checkout {
    tmp: TempDir,
    upstream: String,
    repo: GitRepository,
    lock: RepositoryLock,
}

impl Checkout {
    fn root(&self) -> &Path {
        self.tmp.path()
    }

    async fn guard(&self) -> RepositoryLockGuard {
        self.lock.acquire(Duration::from_secs(5)).await.unwrap()
    }

    fn write(&self, file: &str, content: &str) {
        let path = self.repo.path().join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

async fn cloned_checkout() -> Checkout {
    let tmp = temp_dir();
    let upstream = init_upstream(tmp.path());
    let path = tmp.path().join("vcs/demo/core");
    let repo = GitRepository::new(&path, GitFlavor::Plain, "main", settings());
    let lock = RepositoryLock::new(&path);
    let checkout = Checkout {
        tmp,
        upstream,
        repo,
        lock,
    };
    let guard = checkout.guard().await;
    checkout
        .repo
        .clone_from(&guard, &checkout.upstream)
        .await
        .unwrap();
    checkout
        .repo
        .configure_remote(&guard, &checkout.upstream, "")
        .await
        .unwrap();
    checkout
}

/// Adds a commit to the upstream through a second clone.
fn advance_upstream(checkout: &Checkout, file: &str, content: &str) {
    let other = checkout.root().join("other");
    if !other.exists() {
        git(
            checkout.root(),
            &["clone", "--quiet", &checkout.upstream, "other"],
        );
    }
    git(&other, &["pull", "--quiet"]);
    std::fs::write(other.join(file), content).unwrap();
    git(&other, &["commit", "--quiet", "-am", "Upstream change"]);
    git(&other, &["push", "--quiet", "origin", "main"]);
}

fn ts(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_767_225_600 + secs, 0).unwrap()
}

#[tokio::test]
async fn test_lock_times_out_while_held() {
    let tmp = temp_dir();
    let lock = RepositoryLock::new(tmp.path().join("checkout"));
    let guard = lock.acquire(Duration::from_secs(1)).await.unwrap();

    let err = lock.acquire(Duration::from_millis(250)).await.unwrap_err();
    assert!(matches!(err, LockError::Timeout { .. }), "{err}");
    assert!(SyncError::from(err).is_lock_timeout());

    drop(guard);
    assert!(lock.acquire(Duration::from_millis(250)).await.is_ok());
    assert!(lock.lock_path().ends_with("checkout.lock"));
}

#[tokio::test]
async fn test_mutation_without_matching_lock_is_rejected() {
    let checkout = cloned_checkout().await;
    let foreign = RepositoryLock::new(checkout.root().join("elsewhere"));
    let guard = foreign.acquire(Duration::from_secs(1)).await.unwrap();

    let err = checkout
        .repo
        .commit(&guard, "msg", "", ts(0), &[])
        .await
        .unwrap_err();
    assert!(
        matches!(err.as_vcs(), Some(VcsError::LockNotHeld { .. })),
        "{err}"
    );
}

#[tokio::test]
async fn test_commit_and_push_round() {
    let checkout = cloned_checkout().await;
    let repo = &checkout.repo;
    assert!(repo.is_valid());
    assert!(!repo.needs_commit(&[]).await.unwrap());
    assert!(!repo.needs_push().await.unwrap());

    checkout.write("po/de.po", "msgid \"a\"\nmsgstr \"A\"\n");
    let files = vec!["po/de.po".to_string()];
    assert!(repo.needs_commit(&files).await.unwrap());
    assert!(!repo.needs_commit(&["po/cs.po".to_string()]).await.unwrap());

    let guard = checkout.guard().await;
    let before = repo.last_revision().await.unwrap();
    let committed = repo
        .commit(&guard, "Translated using Transync (German)", "Jane <jane@example.com>", ts(10), &files)
        .await
        .unwrap();
    assert!(committed);
    assert_ne!(repo.last_revision().await.unwrap(), before);
    assert!(repo.needs_push().await.unwrap());

    let info = repo.revision_info("HEAD").await.unwrap();
    assert_eq!(info.author(), "Jane <jane@example.com>");
    assert_eq!(info.author_date, ts(10));
    assert_eq!(info.summary, "Translated using Transync (German)");
    assert_eq!(repo.changed_files("HEAD").await.unwrap(), vec!["po/de.po"]);

    // nothing left to commit
    assert!(!repo.commit(&guard, "again", "", ts(20), &files).await.unwrap());

    repo.push(&guard, "").await.unwrap();
    repo.update_remote(&guard).await.unwrap();
    assert!(!repo.needs_push().await.unwrap());
    assert_eq!(
        repo.last_remote_revision().await.unwrap(),
        repo.last_revision().await.unwrap()
    );
}

#[tokio::test]
async fn test_commit_uses_committer_identity() {
    let checkout = cloned_checkout().await;
    let guard = checkout.guard().await;
    checkout.write("po/de.po", "changed\n");
    checkout
        .repo
        .commit(&guard, "msg", "", ts(0), &[])
        .await
        .unwrap();

    let committer = checkout
        .repo
        .execute(&["log", "-1", "--format=%cn <%ce>|%an <%ae>"])
        .await
        .unwrap();
    assert_eq!(
        committer.trim(),
        "Transync <transync@example.com>|Anonymous <transync@example.com>"
    );
}

#[tokio::test]
async fn test_needs_merge_and_merge() {
    let checkout = cloned_checkout().await;
    let repo = &checkout.repo;
    let guard = checkout.guard().await;

    advance_upstream(&checkout, "po/cs.po", "upstream\n");
    assert!(!repo.needs_merge().await.unwrap());
    repo.update_remote(&guard).await.unwrap();
    assert!(repo.needs_merge().await.unwrap());

    checkout.write("po/de.po", "local\n");
    repo.commit(&guard, "local", "", ts(0), &[]).await.unwrap();
    repo.merge(&guard, false, MergeMode::Merge, "Merge upstream")
        .await
        .unwrap();

    assert!(!repo.needs_merge().await.unwrap());
    let content = std::fs::read_to_string(repo.path().join("po/cs.po")).unwrap();
    assert_eq!(content, "upstream\n");
    let head = repo.revision_info("HEAD").await.unwrap();
    assert_eq!(head.summary, "Merge upstream");
}

#[tokio::test]
async fn test_rebase_conflict_then_abort() {
    let checkout = cloned_checkout().await;
    let repo = &checkout.repo;
    let guard = checkout.guard().await;

    advance_upstream(&checkout, "po/de.po", "theirs\n");
    repo.update_remote(&guard).await.unwrap();
    checkout.write("po/de.po", "ours\n");
    repo.commit(&guard, "ours", "", ts(0), &[]).await.unwrap();
    let local = repo.last_revision().await.unwrap();

    let err = repo.rebase(&guard, false).await.unwrap_err();
    match err.as_vcs() {
        Some(VcsError::CommandFailed { retcode, .. }) => assert_ne!(*retcode, 0),
        other => panic!("unexpected error: {other:?}"),
    }

    repo.rebase(&guard, true).await.unwrap();
    assert_eq!(repo.last_revision().await.unwrap(), local);

    repo.reset(&guard).await.unwrap();
    assert_eq!(
        repo.last_revision().await.unwrap(),
        repo.last_remote_revision().await.unwrap()
    );
    assert!(!repo.needs_push().await.unwrap());
}

#[tokio::test]
async fn test_cleanup_removes_untracked() {
    let checkout = cloned_checkout().await;
    let guard = checkout.guard().await;
    checkout.write("stray/file.txt", "x");
    checkout.repo.cleanup(&guard).await.unwrap();
    assert!(!checkout.repo.path().join("stray").exists());
}

#[tokio::test]
async fn test_remove_commits_deletion() {
    let checkout = cloned_checkout().await;
    let guard = checkout.guard().await;
    checkout
        .repo
        .remove(&guard, &["po/cs.po".to_string()], "Removed Czech", "")
        .await
        .unwrap();
    assert!(!checkout.repo.path().join("po/cs.po").exists());
    let head = checkout.repo.revision_info("HEAD").await.unwrap();
    assert_eq!(head.summary, "Removed Czech");
}

#[tokio::test]
async fn test_squash_author_yields_one_commit_per_author() {
    let checkout = cloned_checkout().await;
    let repo = &checkout.repo;
    let guard = checkout.guard().await;

    let edits = [
        ("po/de.po", "a1\n", "A <a@example.com>"),
        ("po/cs.po", "b1\n", "B <b@example.com>"),
        ("po/fr.po", "a2\n", "A <a@example.com>"),
        ("po/it.po", "b2\n", "B <b@example.com>"),
        ("po/es.po", "a3\n", "A <a@example.com>"),
    ];
    for (i, (file, content, author)) in edits.iter().enumerate() {
        checkout.write(file, content);
        repo.commit(&guard, &format!("change {i}"), author, ts(i as i64), &[])
            .await
            .unwrap();
    }
    let tree_before = repo.execute(&["rev-parse", "HEAD^{tree}"]).await.unwrap();

    repo.squash_author(&guard).await.unwrap();

    let remote = repo.remote_branch_name();
    let revisions = repo.log_revisions(&format!("{remote}..HEAD")).await.unwrap();
    assert_eq!(revisions.len(), 2);
    let first = repo.revision_info(&revisions[0]).await.unwrap();
    let second = repo.revision_info(&revisions[1]).await.unwrap();
    assert_eq!(first.author_email, "a@example.com");
    assert_eq!(second.author_email, "b@example.com");
    assert_eq!(first.message, "change 0\n\nchange 2\n\nchange 4");
    assert_eq!(
        repo.execute(&["rev-parse", "HEAD^{tree}"]).await.unwrap(),
        tree_before
    );
}

#[tokio::test]
async fn test_squash_author_falls_back_on_conflict() {
    let checkout = cloned_checkout().await;
    let repo = &checkout.repo;
    let guard = checkout.guard().await;

    // B edits the line A wrote, so A's commits cannot be grouped ahead of B's.
    let edits = [
        ("a1\n", "A <a@example.com>"),
        ("a1\nb1\n", "B <b@example.com>"),
        ("a2\nb1\n", "A <a@example.com>"),
    ];
    for (i, (content, author)) in edits.iter().enumerate() {
        checkout.write("po/de.po", content);
        repo.commit(&guard, &format!("change {i}"), author, ts(i as i64), &[])
            .await
            .unwrap();
    }
    repo.squash_author(&guard).await.unwrap();

    let remote = repo.remote_branch_name();
    let revisions = repo.log_revisions(&format!("{remote}..HEAD")).await.unwrap();
    assert_eq!(revisions.len(), 3);
    let content = std::fs::read_to_string(repo.path().join("po/de.po")).unwrap();
    assert_eq!(content, "a2\nb1\n");
    assert!(!repo.path().join(".git/CHERRY_PICK_HEAD").exists());
}

#[tokio::test]
async fn test_squash_all_adds_co_author_trailers() {
    let checkout = cloned_checkout().await;
    let repo = &checkout.repo;
    let guard = checkout.guard().await;

    for (i, author) in ["A <a@example.com>", "B <b@example.com>"].iter().enumerate() {
        checkout.write(&format!("po/x{i}.po"), "x\n");
        repo.commit(&guard, &format!("change {i}"), author, ts(i as i64), &[])
            .await
            .unwrap();
    }
    repo.squash_all(&guard).await.unwrap();

    let remote = repo.remote_branch_name();
    let revisions = repo.log_revisions(&format!("{remote}..HEAD")).await.unwrap();
    assert_eq!(revisions.len(), 1);
    let trailers = repo.commit_trailers("HEAD").await.unwrap();
    assert_eq!(
        trailers,
        vec![(
            "Co-authored-by".to_string(),
            "B <b@example.com>".to_string()
        )]
    );
}

#[tokio::test]
async fn test_squash_file_groups_by_path() {
    let checkout = cloned_checkout().await;
    let repo = &checkout.repo;
    let guard = checkout.guard().await;

    for (i, (file, content)) in [("po/de.po", "1\n"), ("po/cs.po", "1\n"), ("po/de.po", "2\n")]
        .iter()
        .enumerate()
    {
        checkout.write(file, content);
        repo.commit(&guard, &format!("change {i}"), "", ts(i as i64), &[])
            .await
            .unwrap();
    }
    repo.squash_file(&guard).await.unwrap();

    let remote = repo.remote_branch_name();
    let revisions = repo.log_revisions(&format!("{remote}..HEAD")).await.unwrap();
    assert_eq!(revisions.len(), 2);
    let mut files = Vec::new();
    for rev in &revisions {
        files.extend(repo.changed_files(rev).await.unwrap());
    }
    files.sort();
    assert_eq!(files, vec!["po/cs.po", "po/de.po"]);
}

#[tokio::test]
async fn test_clone_failure_hides_remote_url() {
    let tmp = temp_dir();
    let path = tmp.path().join("vcs/demo/core");
    let repo = GitRepository::new(&path, GitFlavor::Plain, "main", settings());
    let lock = RepositoryLock::new(&path);
    let guard = lock.acquire(Duration::from_secs(1)).await.unwrap();

    let url = format!("file://{}/token-s3cret/missing.git", tmp.path().display());
    let err = repo.clone_from(&guard, &url).await.unwrap_err();
    let SyncError::Vcs(vcs) = &err else {
        panic!("expected a vcs error, got {err}");
    };
    let VcsError::CommandFailed { command, .. } = vcs.as_ref() else {
        panic!("expected a failed command, got {vcs}");
    };
    assert!(command.ends_with("clone ..."), "{command}");
    assert!(!command.contains("s3cret"));
}

#[tokio::test]
async fn test_local_repository_has_no_remote() {
    let tmp = temp_dir();
    let path = tmp.path().join("local");
    let repo = GitRepository::new(&path, GitFlavor::Local, "main", settings());
    let lock = RepositoryLock::new(&path);
    let guard = lock.acquire(Duration::from_secs(1)).await.unwrap();

    repo.clone_from(&guard, "").await.unwrap();
    std::fs::write(path.join("de.po"), "x").unwrap();
    assert!(repo.commit(&guard, "init", "", ts(0), &[]).await.unwrap());
    assert!(!repo.needs_push().await.unwrap());
    assert!(!repo.needs_merge().await.unwrap());
    repo.push(&guard, "").await.unwrap();
    assert_eq!(repo.kind(), VcsKind::Local);
}

#[tokio::test]
async fn test_open_repository_selects_backend() {
    let tmp = temp_dir();
    let hg = open_repository(VcsKind::Mercurial, tmp.path(), "", settings());
    assert_eq!(hg.kind(), VcsKind::Mercurial);
    assert!(hg.as_git().is_none());
    assert!(!hg.is_valid());

    let gerrit = open_repository(VcsKind::Gerrit, tmp.path(), "main", settings());
    assert_eq!(
        gerrit.as_git().map(GitRepository::flavor),
        Some(GitFlavor::Gerrit)
    );
}

#[test]
fn test_format_author() {
    let fallback = "noreply@example.com";
    assert_eq!(format_author("Jane <jane@x>", fallback), "Jane <jane@x>");
    assert_eq!(format_author("", fallback), "Anonymous <noreply@example.com>");
    assert_eq!(format_author("jane@x", fallback), "jane@x <jane@x>");
    assert_eq!(format_author("Jane Doe", fallback), "Jane Doe <noreply@example.com>");
}

#[test]
fn test_parse_github_url() {
    let expected = Some(("owner".to_string(), "repo".to_string()));
    assert_eq!(parse_github_url("https://github.com/owner/repo.git"), expected);
    assert_eq!(parse_github_url("git@github.com:owner/repo.git"), expected);
    assert_eq!(parse_github_url("ssh://git@github.com/owner/repo"), expected);
    assert_eq!(parse_github_url("https://gitlab.com/owner/repo"), None);
}

#[test]
fn test_parse_revision_info_and_trailers() {
    let raw = "abc\0Jane\0jane@x\02026-01-01T00:00:10+00:00\0Subject\n\nBody\n\nCo-authored-by: B <b@x>\n";
    let info = parse_revision_info(raw).unwrap();
    assert_eq!(info.revision, "abc");
    assert_eq!(info.summary, "Subject");
    assert_eq!(info.author_date, ts(10));
    assert!(info.message.ends_with("Co-authored-by: B <b@x>"));

    assert_eq!(
        parse_trailers("Co-authored-by: B <b@x>\nSigned-off-by: A <a@x>\n"),
        vec![
            ("Co-authored-by".to_string(), "B <b@x>".to_string()),
            ("Signed-off-by".to_string(), "A <a@x>".to_string()),
        ]
    );
    assert!(parse_trailers("not a trailer line\n").is_empty());
}
