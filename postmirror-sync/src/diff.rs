//! Dry-run unified diff support for `postmirror diff`.

use similar::TextDiff;

use postmirror_core::types::FileName;

use crate::engine::{Action, ReconciliationPlan};
use crate::local_index::LocalStoreIndex;

/// What a diff describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Create,
    Update,
    Archive,
}

/// A single file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub file_name: FileName,
    pub kind: DiffKind,
    pub unified_diff: String,
}

/// Render a unified diff for every mutating action in `plan`.
///
/// Creates diff against empty content, archives against empty new content.
/// No files are written.
pub fn diff_plan(plan: &ReconciliationPlan, index: &LocalStoreIndex) -> Vec<FileDiff> {
    let mut diffs = Vec::new();
    for action in &plan.actions {
        let (kind, old, new) = match action {
            Action::Unchanged(_) => continue,
            Action::Create(entry) => (DiffKind::Create, String::new(), entry.content.clone()),
            Action::Update(entry) => (
                DiffKind::Update,
                read_lossy(index, &entry.file_name),
                entry.content.clone(),
            ),
            Action::Archive(name) => (DiffKind::Archive, read_lossy(index, name), String::new()),
        };

        let name = action.file_name();
        let old_header = match kind {
            DiffKind::Create => "/dev/null".to_string(),
            _ => format!("a/{name}"),
        };
        let new_header = match kind {
            DiffKind::Archive => "/dev/null".to_string(),
            _ => format!("b/{name}"),
        };
        let unified = TextDiff::from_lines(&old, &new)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            file_name: name.clone(),
            kind,
            unified_diff: unified,
        });
    }
    diffs
}

fn read_lossy(index: &LocalStoreIndex, name: &FileName) -> String {
    match index.content_of(name) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            tracing::warn!("{name}: {err}; diffing against empty content");
            String::new()
        }
    }
}
