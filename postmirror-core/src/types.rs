//! Domain types shared by the sync engine and the CLI.
//!
//! Remote records are deserialized straight from the source payload; file
//! names are plain newtypes, validated by the normalizer in `postmirror-sync`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable key of a remote record. Sources emit either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// `true` when the identifier cannot be used to build a file name.
    pub fn is_blank(&self) -> bool {
        match self {
            RecordId::Int(_) => false,
            RecordId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => n.fmt(f),
            RecordId::Text(s) => s.fmt(f),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Name of a file in the active store or the archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileName(pub String);

impl FileName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FileName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FileName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One content record as delivered by the remote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(rename = "id", alias = "identifier")]
    pub identifier: RecordId,

    /// Human-assigned file name. Absent, `null` and blank all mean "derive one".
    #[serde(
        rename = "file_name",
        alias = "explicitName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub explicit_name: Option<String>,

    pub content: String,
}

impl RemoteRecord {
    pub fn new(identifier: impl Into<RecordId>, content: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            explicit_name: None,
            content: content.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.explicit_name = Some(name.into());
        self
    }
}

/// Canonical `(file name, content)` view of a [`RemoteRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEntry {
    pub file_name: FileName,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accepts_numeric_and_string_ids() {
        let numeric: RemoteRecord =
            serde_json::from_str(r#"{"id": 7, "content": "x"}"#).unwrap();
        assert_eq!(numeric.identifier, RecordId::Int(7));

        let text: RemoteRecord =
            serde_json::from_str(r#"{"id": "abc", "content": "x"}"#).unwrap();
        assert_eq!(text.identifier, RecordId::Text("abc".into()));
    }

    #[test]
    fn record_reads_file_name_and_aliases() {
        let snake: RemoteRecord =
            serde_json::from_str(r#"{"id": 1, "file_name": "a.md", "content": ""}"#).unwrap();
        assert_eq!(snake.explicit_name.as_deref(), Some("a.md"));

        let camel: RemoteRecord =
            serde_json::from_str(r#"{"identifier": 1, "explicitName": "b.md", "content": ""}"#)
                .unwrap();
        assert_eq!(camel.explicit_name.as_deref(), Some("b.md"));
    }

    #[test]
    fn null_file_name_is_absent() {
        let rec: RemoteRecord =
            serde_json::from_str(r#"{"id": 1, "file_name": null, "content": "c"}"#).unwrap();
        assert!(rec.explicit_name.is_none());
    }

    #[test]
    fn missing_content_is_rejected() {
        let err = serde_json::from_str::<RemoteRecord>(r#"{"id": 1}"#).unwrap_err();
        assert!(err.to_string().contains("content"));
    }

    #[test]
    fn blank_identifier_detection() {
        assert!(RecordId::from("  ").is_blank());
        assert!(!RecordId::from("x").is_blank());
        assert!(!RecordId::from(0).is_blank());
    }
}
