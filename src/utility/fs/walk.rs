// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parallel checkout traversal.
//!
//! ```text
//! parallel_walk(root, WalkOptions)
//!   ignore::WalkParallel (follow links, skip .git/.hg/.svn)
//!     --> flume channel --> Vec<WalkEntry> sorted by relative path
//! ```

use bon::Builder;
use flume::unbounded;
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::error::{FsError, SyncResult};

/// Options for parallel directory traversal.
#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    /// Maximum depth to traverse (None = unlimited)
    #[builder(setters(name = with_max_depth))]
    max_depth: Option<usize>,
    /// Follow symbolic links
    #[builder(setters(name = with_follow_links), default = false)]
    follow_links: bool,
    /// Include hidden files/directories
    #[builder(setters(name = with_include_hidden), default = false)]
    include_hidden: bool,
    /// Respect .gitignore files
    #[builder(setters(name = with_respect_gitignore), default = true)]
    respect_gitignore: bool,
    /// Number of threads (None = auto-detect based on CPU count)
    #[builder(setters(name = with_threads))]
    threads: Option<usize>,
    /// Skip directories matching these names (exact match)
    #[builder(setters(name = with_skip_dirs), default)]
    skip_dirs: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalkOptions {
    #[must_use]
    pub const fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub const fn follow_links(&self) -> bool {
        self.follow_links
    }

    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    #[must_use]
    pub const fn respect_gitignore(&self) -> bool {
        self.respect_gitignore
    }

    #[must_use]
    pub const fn threads(&self) -> Option<usize> {
        self.threads
    }

    #[must_use]
    pub fn skip_dirs(&self) -> &[String] {
        &self.skip_dirs
    }

    /// Options for scanning a VCS checkout for translation files.
    ///
    /// - Follows symlinks
    /// - Includes hidden files and ignored files
    /// - Skips VCS metadata directories
    #[must_use]
    pub fn for_checkout() -> Self {
        Self::builder()
            .with_follow_links(true)
            .with_include_hidden(true)
            .with_respect_gitignore(false)
            .with_skip_dirs(vec![".git".to_string(), ".hg".to_string(), ".svn".to_string()])
            .build()
    }
}

/// One file or directory found below the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the root, `/`-separated.
    pub relative: String,
    /// Path as found (not canonicalized).
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Builds a `WalkBuilder` with the given options, using `filter_entry` for directory skipping.
fn build_walker(root: &Path, options: &WalkOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    if let Some(depth) = options.max_depth() {
        builder.max_depth(Some(depth));
    }

    builder.follow_links(options.follow_links());
    builder.hidden(!options.include_hidden());
    builder.ignore(options.respect_gitignore());
    builder.parents(options.respect_gitignore());
    builder.git_ignore(options.respect_gitignore());
    builder.git_global(options.respect_gitignore());
    builder.git_exclude(options.respect_gitignore());

    if let Some(threads) = options.threads() {
        builder.threads(threads);
    }

    // filter_entry is evaluated before descending
    if !options.skip_dirs().is_empty() {
        let skip_dirs: Arc<Vec<String>> = Arc::new(options.skip_dirs().to_vec());
        builder.filter_entry(move |entry| {
            !(entry.file_type().is_some_and(|ft| ft.is_dir())
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| skip_dirs.iter().any(|skip| skip == name)))
        });
    }

    builder
}

/// `/`-joined relative path, or `None` for the root itself.
#[must_use]
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Performs parallel directory traversal using `ignore::WalkParallel`.
///
/// Files and directories are both reported; the root is not. Results are
/// sorted by relative path so callers see a deterministic order.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the root directory does not exist.
///
/// # Example
/// ```no_run
/// use transync::utility::fs::walk::{parallel_walk, WalkOptions};
///
/// let entries = parallel_walk("/srv/checkout", &WalkOptions::for_checkout())?;
/// println!("Found {} entries", entries.len());
/// # Ok::<(), transync::error::SyncError>(())
/// ```
pub fn parallel_walk<P: AsRef<Path>>(root: P, options: &WalkOptions) -> SyncResult<Vec<WalkEntry>> {
    let root = root.as_ref();

    if !root.is_dir() {
        return Err(FsError::NotFound(root.display().to_string()).into());
    }

    let (tx, rx) = unbounded::<WalkEntry>();
    let root_path = Arc::new(root.to_path_buf());

    build_walker(root, options).build_parallel().run(|| {
        let tx = tx.clone();
        let root_path = Arc::clone(&root_path);

        Box::new(move |entry_result| {
            match entry_result {
                Ok(entry) => {
                    if let Some(relative) = relative_slash_path(&root_path, entry.path()) {
                        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                        let _ = tx.send(WalkEntry {
                            relative,
                            path: entry.path().to_path_buf(),
                            is_dir,
                        });
                    }
                }
                Err(e) => warn!(error = %e, "walk error"),
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut entries: Vec<WalkEntry> = rx.iter().collect();
    entries.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(entries)
}
