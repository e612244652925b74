//! Moves files out of the active store into the archive directory.
//!
//! The archive is flat and last-archived-wins: a file archived under a name
//! that is already present replaces it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to archive a single file.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The source was gone by the time of the move.
    #[error("source vanished: {0}")]
    SourceMissing(PathBuf),

    #[error("source has no file name: {0}")]
    NoFileName(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.into(),
        source,
    }
}

/// Move `source` into `archive_dir`, keeping its base name.
///
/// Returns the archived path. Creates `archive_dir` when needed. Falls back to
/// copy + remove when a plain rename is refused (e.g. across filesystems).
pub fn archive(source: &Path, archive_dir: &Path) -> Result<PathBuf, ArchiveError> {
    let Some(name) = source.file_name() else {
        return Err(ArchiveError::NoFileName(source.to_path_buf()));
    };
    if !source.exists() {
        return Err(ArchiveError::SourceMissing(source.to_path_buf()));
    }
    std::fs::create_dir_all(archive_dir).map_err(|e| io_err(archive_dir, e))?;
    let target = archive_dir.join(name);

    match std::fs::rename(source, &target) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound && !source.exists() => {
            return Err(ArchiveError::SourceMissing(source.to_path_buf()));
        }
        Err(err) => {
            tracing::debug!(
                "rename {} -> {} failed ({err}); copying instead",
                source.display(),
                target.display()
            );
            copy_then_remove(source, &target)?;
        }
    }

    tracing::info!("archived: {} -> {}", source.display(), target.display());
    Ok(target)
}

fn copy_then_remove(source: &Path, target: &Path) -> Result<(), ArchiveError> {
    match std::fs::copy(source, target) {
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound && !source.exists() => {
            return Err(ArchiveError::SourceMissing(source.to_path_buf()));
        }
        Err(err) => return Err(io_err(target, err)),
    }
    std::fs::remove_file(source).map_err(|e| io_err(source, e))
}
