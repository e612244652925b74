//! Shared pass entrypoint used by every CLI command.

use postmirror_core::types::RemoteRecord;

use crate::engine::{self, ReconciliationResult, StoreLayout};
use crate::normalize::normalize_all;
use crate::SyncError;

/// Whether a pass touches the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Apply,
    /// Report what would happen; nothing is created, written or moved.
    DryRun,
}

/// Normalize `records` and reconcile them against `layout`.
///
/// Skipped records are logged and listed in the result; they never abort
/// the pass.
pub fn run(
    records: &[RemoteRecord],
    layout: &StoreLayout,
    mode: RunMode,
) -> Result<ReconciliationResult, SyncError> {
    let normalized = normalize_all(records);
    let mut result = match mode {
        RunMode::Apply => engine::reconcile(&normalized.entries, layout)?,
        RunMode::DryRun => {
            let (plan, _index) = engine::plan_only(&normalized.entries, layout)?;
            plan.preview()
        }
    };
    result.skipped = normalized.skipped;
    Ok(result)
}
