//! Remote source: one blocking fetch of the record list.
//!
//! `http://` and `https://` sources go through `ureq`; anything else is read
//! as a local JSON file. The payload must be a JSON array of records.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use postmirror_core::types::RemoteRecord;

/// Failures that abort a run before any filesystem change.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot read source file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{origin} did not return valid JSON: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

fn is_http(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch and parse the full record list from `source`.
pub fn fetch(source: &str, timeout: Option<Duration>) -> Result<Vec<RemoteRecord>, SourceError> {
    let body = if is_http(source) {
        fetch_http(source, timeout)?
    } else {
        let path = PathBuf::from(source);
        std::fs::read_to_string(&path).map_err(|e| SourceError::Read { path, source: e })?
    };
    parse_records(&body, source)
}

fn fetch_http(url: &str, timeout: Option<Duration>) -> Result<String, SourceError> {
    let mut request = ureq::get(url).set("Accept", "application/json");
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }
    tracing::info!(url, "fetching records");
    let response = request.call().map_err(|e| SourceError::Http {
        url: url.to_string(),
        source: Box::new(e),
    })?;
    response.into_string().map_err(|e| SourceError::Body {
        url: url.to_string(),
        source: e,
    })
}

/// Parse a source payload.
///
/// A top-level value that is not an array counts as "no content". Array
/// elements that are not valid records are dropped one by one.
pub fn parse_records(body: &str, origin: &str) -> Result<Vec<RemoteRecord>, SourceError> {
    let value: Value = serde_json::from_str(body).map_err(|e| SourceError::Json {
        origin: origin.to_string(),
        source: e,
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            tracing::warn!(
                origin,
                found = json_kind(&other),
                "expected a JSON array of records; treating as no content"
            );
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RemoteRecord>(item) {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!(position, error = %err, "dropping malformed record"),
        }
    }
    tracing::info!(count = records.len(), "records received");
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use postmirror_core::types::RecordId;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn parses_array_of_records() {
        let body = r#"[
            {"id": 1, "content": "hello"},
            {"id": 2, "file_name": "about.md", "content": "about"}
        ]"#;
        let records = parse_records(body, "test").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, RecordId::Int(1));
        assert_eq!(records[1].explicit_name.as_deref(), Some("about.md"));
    }

    #[test]
    fn non_array_is_no_content() {
        let records = parse_records(r#"{"message": "ok"}"#, "test").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn malformed_records_are_dropped_individually() {
        let body = r#"[{"id": 1}, {"content": "no id"}, {"id": 3, "content": "ok"}]"#;
        let records = parse_records(body, "test").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, RecordId::Int(3));
    }

    #[test]
    fn invalid_json_is_fatal() {
        let err = parse_records("<html>", "https://example.com").unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
        assert!(err.to_string().contains("https://example.com"));
    }

    #[test]
    fn reads_local_file_source() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("records.json");
        std::fs::write(&path, r#"[{"id": "a", "content": "x"}]"#).unwrap();

        let records = fetch(path.to_str().unwrap(), None).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_local_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.json");
        let err = fetch(path.to_str().unwrap(), None).unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
    }
}
