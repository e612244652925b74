//! Record normalization: remote record → `(file name, content)`.
//!
//! A non-blank `file_name` from the source is used verbatim. Otherwise the
//! name is derived from the identifier as `post-<id>.md`.

use std::fmt;

use serde::Serialize;

use postmirror_core::types::{FileName, NormalizedEntry, RecordId, RemoteRecord};

use crate::writer::TMP_SUFFIX;

pub const FALLBACK_PREFIX: &str = "post-";
pub const FALLBACK_EXTENSION: &str = "md";

/// Why a record was left out of the reconciliation set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// No usable explicit name and the identifier is blank.
    BlankIdentifier,
    /// The chosen name is not a single flat path component.
    InvalidName(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BlankIdentifier => write!(f, "blank identifier and no file name"),
            SkipReason::InvalidName(name) => write!(f, "invalid file name '{name}'"),
        }
    }
}

/// A record excluded by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub identifier: RecordId,
    pub reason: SkipReason,
}

/// Output of [`normalize_all`]; entries keep input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub entries: Vec<NormalizedEntry>,
    pub skipped: Vec<SkippedRecord>,
}

/// Map one record to its canonical entry.
pub fn normalize(record: &RemoteRecord) -> Result<NormalizedEntry, SkipReason> {
    let name = match record.explicit_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_owned(),
        _ => fallback_name(&record.identifier)?,
    };
    if !is_flat_name(&name) {
        return Err(SkipReason::InvalidName(name));
    }
    Ok(NormalizedEntry {
        file_name: FileName(name),
        content: record.content.clone(),
    })
}

/// Normalize every record, collecting skips instead of failing.
pub fn normalize_all(records: &[RemoteRecord]) -> Normalized {
    let mut out = Normalized::default();
    for record in records {
        match normalize(record) {
            Ok(entry) => out.entries.push(entry),
            Err(reason) => {
                tracing::warn!("skipping record {}: {reason}", record.identifier);
                out.skipped.push(SkippedRecord {
                    identifier: record.identifier.clone(),
                    reason,
                });
            }
        }
    }
    out
}

/// `post-<identifier>.md`
pub fn fallback_name(identifier: &RecordId) -> Result<String, SkipReason> {
    if identifier.is_blank() {
        return Err(SkipReason::BlankIdentifier);
    }
    Ok(format!("{FALLBACK_PREFIX}{identifier}.{FALLBACK_EXTENSION}"))
}

/// The store is flat; a name must not reach into or out of a subdirectory,
/// nor look like an in-flight write the index ignores.
fn is_flat_name(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.ends_with(TMP_SUFFIX)
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn file_name(record: RemoteRecord) -> String {
        normalize(&record).expect("normalizes").file_name.0
    }

    #[test]
    fn explicit_name_wins() {
        let rec = RemoteRecord::new(1, "x").with_name("hello-world.md");
        assert_eq!(file_name(rec), "hello-world.md");
    }

    #[test]
    fn explicit_name_is_used_verbatim() {
        let rec = RemoteRecord::new(1, "x").with_name(" spaced.md ");
        assert_eq!(file_name(rec), " spaced.md ");
    }

    #[rstest]
    #[case::absent(None)]
    #[case::empty(Some(""))]
    #[case::whitespace(Some("  \t"))]
    fn blank_or_missing_name_falls_back(#[case] name: Option<&str>) {
        let mut rec = RemoteRecord::new(2, "x");
        rec.explicit_name = name.map(str::to_owned);
        assert_eq!(file_name(rec), "post-2.md");
    }

    #[test]
    fn string_identifier_fallback() {
        let rec = RemoteRecord::new("1699-abc", "x");
        assert_eq!(file_name(rec), "post-1699-abc.md");
    }

    #[test]
    fn content_is_copied() {
        let entry = normalize(&RemoteRecord::new(3, "body")).unwrap();
        assert_eq!(entry.content, "body");
    }

    #[test]
    fn blank_identifier_without_name_is_skipped() {
        let rec = RemoteRecord::new(" ", "x");
        assert_eq!(normalize(&rec), Err(SkipReason::BlankIdentifier));
    }

    #[test]
    fn blank_identifier_with_name_is_fine() {
        let rec = RemoteRecord::new("", "x").with_name("named.md");
        assert_eq!(file_name(rec), "named.md");
    }

    #[rstest]
    #[case("../escape.md")]
    #[case("nested/post.md")]
    #[case("win\\post.md")]
    #[case("..")]
    #[case(".")]
    #[case("notes.postmirror.tmp")]
    fn path_like_names_are_rejected(#[case] name: &str) {
        let rec = RemoteRecord::new(1, "x").with_name(name);
        assert!(matches!(normalize(&rec), Err(SkipReason::InvalidName(_))));
    }

    #[test]
    fn identifier_with_separator_is_rejected() {
        let rec = RemoteRecord::new("a/b", "x");
        assert_eq!(
            normalize(&rec),
            Err(SkipReason::InvalidName("post-a/b.md".into()))
        );
    }

    #[test]
    fn normalize_all_keeps_order_and_collects_skips() {
        let records = vec![
            RemoteRecord::new(1, "a"),
            RemoteRecord::new("", "b"),
            RemoteRecord::new(3, "c").with_name("third.md"),
        ];
        let out = normalize_all(&records);
        let names: Vec<_> = out.entries.iter().map(|e| e.file_name.0.as_str()).collect();
        assert_eq!(names, ["post-1.md", "third.md"]);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].identifier, RecordId::from(""));
        assert_eq!(out.skipped[0].reason, SkipReason::BlankIdentifier);
    }
}
