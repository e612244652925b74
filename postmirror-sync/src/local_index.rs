//! Snapshot of the active store directory.
//!
//! [`LocalStoreIndex::scan`] lists file names once; contents are read lazily
//! through [`LocalStoreIndex::content_of`]. A listing failure aborts the
//! pass, a read failure only affects the one file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use postmirror_core::types::FileName;

use crate::error::{io_err, SyncError};
use crate::writer::TMP_SUFFIX;

/// Why a local file's content could not be read.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Not in the index, or removed since the scan.
    #[error("file vanished")]
    NotFound,
    /// Present but unreadable.
    #[error("unreadable: {0}")]
    Io(std::io::Error),
}

/// Regular files currently in the store, keyed by name.
#[derive(Debug, Clone)]
pub struct LocalStoreIndex {
    files: BTreeMap<FileName, PathBuf>,
}

impl LocalStoreIndex {
    /// List `dir`. Subdirectories, non-UTF-8 names and writer temp files are
    /// left out.
    pub fn scan(dir: &Path) -> Result<Self, SyncError> {
        let mut files = BTreeMap::new();
        let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_err(dir, e))?;
            let path = entry.path();
            let is_file = match entry.file_type() {
                Ok(t) => t.is_file(),
                Err(err) => {
                    tracing::warn!("cannot stat {}: {err}", path.display());
                    continue;
                }
            };
            if !is_file {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!("ignoring non-UTF-8 file name: {}", path.display());
                continue;
            };
            if name.ends_with(TMP_SUFFIX) {
                tracing::debug!("ignoring leftover temp file: {}", path.display());
                continue;
            }
            files.insert(FileName(name), path);
        }
        Ok(Self { files })
    }

    /// An empty index, for a store directory that does not exist yet.
    pub fn empty() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    pub fn exists(&self, name: &FileName) -> bool {
        self.files.contains_key(name)
    }

    /// Indexed names in sorted order.
    pub fn file_names(&self) -> impl Iterator<Item = &FileName> {
        self.files.keys()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Current on-disk bytes of an indexed file.
    pub fn content_of(&self, name: &FileName) -> Result<Vec<u8>, ReadError> {
        let Some(path) = self.files.get(name) else {
            return Err(ReadError::NotFound);
        };
        match std::fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(ReadError::NotFound),
            Err(err) => Err(ReadError::Io(err)),
        }
    }
}
