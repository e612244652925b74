//! Error types for postmirror-sync.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a reconciliation pass.
///
/// Per-file conditions (unreadable local file, vanished archive source) are
/// not represented here; they are reported in the pass result instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store and archive directories cannot be used together.
    #[error("invalid store layout: {0}")]
    InvalidLayout(String),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
