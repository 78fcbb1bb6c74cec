// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities.
//!
//! ```text
//! walk:  parallel_walk()  ignore::WalkParallel (multi-core)
//!        WalkOptions      max_depth, hidden, gitignore, skip_dirs
//! write_atomic()          tempfile in the same directory + rename
//! ```

pub mod walk;


use std::io::Write as _;
use std::path::Path;

use crate::error::{FsError, SyncResult};

/// Replaces a file's content through a temporary sibling and a rename.
///
/// Readers never observe a half-written translation file.
///
/// # Errors
///
/// Returns `FsError::IoError` if the directory cannot be created or the
/// temporary file cannot be written or persisted.
pub fn write_atomic(path: &Path, content: &[u8]) -> SyncResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| FsError::io(dir, e))?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| FsError::io(dir, e))?;
    file.write_all(content).map_err(|e| FsError::io(path, e))?;
    file.as_file().sync_all().map_err(|e| FsError::io(path, e))?;
    file.persist(path).map_err(|e| FsError::io(path, e.error))?;
    Ok(())
}
