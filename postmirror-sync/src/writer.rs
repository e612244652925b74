//! Atomic file writer.
//!
//! 1. Ensure the parent directory exists.
//! 2. Write to `<path>.postmirror.tmp`.
//! 3. Rename to the final path (atomic on POSIX).
//!
//! A failed rename removes the temp file and leaves any existing target as it
//! was. Change detection happens before this point, in the planner.

use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Suffix of in-flight writes; the store index ignores these.
pub const TMP_SUFFIX: &str = ".postmirror.tmp";

pub(crate) fn tmp_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}{TMP_SUFFIX}", path.display()))
}

/// Atomically replace (or create) `path` with `content`.
pub fn atomic_write(path: &Path, content: &str) -> Result<(), SyncError> {
    atomic_write_with_tmp(path, content, &tmp_path_for(path))
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
