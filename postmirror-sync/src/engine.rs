//! Reconciliation engine.
//!
//! A pass is split in two:
//!
//! 1. [`plan`] — pure decision step over two snapshots (normalized remote
//!    entries, [`LocalStoreIndex`]). Produces an ordered action list and
//!    touches nothing but reads of existing local files.
//! 2. [`apply`] — executes the actions in order: atomic writes for creates
//!    and updates, [`archive`](crate::archive::archive) moves for the rest.
//!
//! [`reconcile`] runs both against a [`StoreLayout`].

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use postmirror_core::types::{FileName, NormalizedEntry};
use postmirror_core::Config;

use crate::archive::{self, ArchiveError};
use crate::error::{io_err, SyncError};
use crate::hasher;
use crate::local_index::LocalStoreIndex;
use crate::normalize::SkippedRecord;
use crate::writer;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Active store and archive directories for a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub store_dir: PathBuf,
    pub archive_dir: PathBuf,
}

impl StoreLayout {
    pub fn new(store_dir: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            archive_dir: archive_dir.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if same_dir(&self.store_dir, &self.archive_dir) {
            return Err(SyncError::InvalidLayout(format!(
                "store and archive are the same directory: {}",
                self.store_dir.display()
            )));
        }
        Ok(())
    }

    pub fn store_path(&self, name: &FileName) -> PathBuf {
        self.store_dir.join(name.as_str())
    }
}

/// Lexical comparison ignoring `.` components, so `./posts` equals `posts`.
fn same_dir(a: &Path, b: &Path) -> bool {
    let strip = |p: &Path| -> PathBuf {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    strip(a) == strip(b)
}

impl From<&Config> for StoreLayout {
    fn from(config: &Config) -> Self {
        Self::new(&config.store_dir, &config.archive_dir)
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One step of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No local file of that name; write it.
    Create(NormalizedEntry),
    /// Local content hash differs; overwrite it.
    Update(NormalizedEntry),
    /// Hashes match; leave the file alone.
    Unchanged(FileName),
    /// No remote entry of that name; move it to the archive.
    Archive(FileName),
}

impl Action {
    pub fn file_name(&self) -> &FileName {
        match self {
            Action::Create(entry) | Action::Update(entry) => &entry.file_name,
            Action::Unchanged(name) | Action::Archive(name) => name,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::Unchanged(_))
    }
}

/// A local file whose operation was dropped because of a per-file I/O problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbandonedFile {
    pub file_name: FileName,
    pub reason: String,
}

/// Ordered actions for one pass: remote entries first (input order), then
/// archives (name order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    pub actions: Vec<Action>,
    pub abandoned: Vec<AbandonedFile>,
}

impl ReconciliationPlan {
    /// `true` when applying would not touch the filesystem.
    pub fn is_noop(&self) -> bool {
        !self.actions.iter().any(Action::is_mutation)
    }

    /// The result [`apply`] would report, assuming every step succeeds.
    pub fn preview(&self) -> ReconciliationResult {
        let mut result = ReconciliationResult {
            abandoned: self.abandoned.clone(),
            ..ReconciliationResult::default()
        };
        for action in &self.actions {
            result.record(action);
        }
        result
    }
}

/// Decide what to do with each remote entry and each local file.
///
/// Entries sharing a file name collapse to the last one in input order, at
/// the position of the first.
pub fn plan(entries: &[NormalizedEntry], index: &LocalStoreIndex) -> ReconciliationPlan {
    let entries = collapse_duplicates(entries);
    let remote: HashSet<&FileName> = entries.iter().map(|e| &e.file_name).collect();
    let mut out = ReconciliationPlan::default();

    for entry in entries.iter().copied() {
        if !index.exists(&entry.file_name) {
            out.actions.push(Action::Create(entry.clone()));
            continue;
        }
        match index.content_of(&entry.file_name) {
            Ok(local) => {
                if hasher::hash(&local) == hasher::hash(&entry.content) {
                    out.actions.push(Action::Unchanged(entry.file_name.clone()));
                } else {
                    out.actions.push(Action::Update(entry.clone()));
                }
            }
            Err(err) => {
                tracing::warn!("{}: {err}; leaving it alone", entry.file_name);
                out.abandoned.push(AbandonedFile {
                    file_name: entry.file_name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    for name in index.file_names() {
        if !remote.contains(name) {
            out.actions.push(Action::Archive(name.clone()));
        }
    }

    out
}

fn collapse_duplicates(entries: &[NormalizedEntry]) -> Vec<&NormalizedEntry> {
    let mut position: HashMap<&FileName, usize> = HashMap::new();
    let mut out: Vec<&NormalizedEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match position.get(&entry.file_name) {
            Some(&i) => {
                tracing::debug!("duplicate file name {}: later record wins", entry.file_name);
                out[i] = entry;
            }
            None => {
                position.insert(&entry.file_name, out.len());
                out.push(entry);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Summary of one pass. `created`, `updated` and `archived` are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub created: Vec<FileName>,
    pub updated: Vec<FileName>,
    pub archived: Vec<FileName>,
    pub skipped: Vec<SkippedRecord>,
    pub abandoned: Vec<AbandonedFile>,
    pub unchanged: usize,
}

impl ReconciliationResult {
    /// `true` when the pass changed nothing on disk.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.archived.is_empty()
    }

    fn record(&mut self, action: &Action) {
        match action {
            Action::Create(entry) => self.created.push(entry.file_name.clone()),
            Action::Update(entry) => self.updated.push(entry.file_name.clone()),
            Action::Unchanged(_) => self.unchanged += 1,
            Action::Archive(name) => self.archived.push(name.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Execute `plan` against `layout`, in order.
///
/// A failed write or archive move only affects that file: it is logged,
/// recorded in `abandoned`, and the pass moves on to the next action.
pub fn apply(
    plan: ReconciliationPlan,
    layout: &StoreLayout,
) -> Result<ReconciliationResult, SyncError> {
    let mut result = ReconciliationResult {
        abandoned: plan.abandoned,
        ..ReconciliationResult::default()
    };

    for action in plan.actions {
        match &action {
            Action::Create(entry) | Action::Update(entry) => {
                let path = layout.store_path(&entry.file_name);
                if let Err(err) = writer::atomic_write(&path, &entry.content) {
                    tracing::warn!("could not write {}: {err}", path.display());
                    result.abandoned.push(AbandonedFile {
                        file_name: entry.file_name.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
                let verb = if matches!(action, Action::Create(_)) {
                    "created"
                } else {
                    "updated"
                };
                tracing::info!("{verb}: {}", path.display());
            }
            Action::Unchanged(name) => {
                tracing::debug!("unchanged: {}", layout.store_path(name).display());
            }
            Action::Archive(name) => {
                let source = layout.store_path(name);
                if let Err(err) = archive::archive(&source, &layout.archive_dir) {
                    log_archive_failure(&source, &err);
                    result.abandoned.push(AbandonedFile {
                        file_name: name.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            }
        }
        result.record(&action);
    }

    Ok(result)
}

fn log_archive_failure(source: &Path, err: &ArchiveError) {
    match err {
        ArchiveError::SourceMissing(_) => {
            tracing::warn!("{} vanished before it could be archived", source.display())
        }
        other => tracing::warn!("could not archive {}: {other}", source.display()),
    }
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

/// Ensure the store directory exists and take a snapshot of it.
pub fn prepare(layout: &StoreLayout) -> Result<LocalStoreIndex, SyncError> {
    layout.validate()?;
    std::fs::create_dir_all(&layout.store_dir).map_err(|e| io_err(&layout.store_dir, e))?;
    LocalStoreIndex::scan(&layout.store_dir)
}

/// Plan against the current local snapshot without mutating anything.
///
/// A missing store directory counts as empty.
pub fn plan_only(
    entries: &[NormalizedEntry],
    layout: &StoreLayout,
) -> Result<(ReconciliationPlan, LocalStoreIndex), SyncError> {
    layout.validate()?;
    let index = if layout.store_dir.exists() {
        LocalStoreIndex::scan(&layout.store_dir)?
    } else {
        LocalStoreIndex::empty()
    };
    Ok((plan(entries, &index), index))
}

/// Converge the store at `layout` to `entries`.
///
/// An empty `entries` archives every local file.
pub fn reconcile(
    entries: &[NormalizedEntry],
    layout: &StoreLayout,
) -> Result<ReconciliationResult, SyncError> {
    let index = prepare(layout)?;
    apply(plan(entries, &index), layout)
}
