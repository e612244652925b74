//! SHA-256 content digests used for change detection.

use std::fmt;

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of a content body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Hash `bytes` exactly as given; no line-ending normalization.
pub fn hash(bytes: impl AsRef<[u8]>) -> ContentDigest {
    let mut h = Sha256::new();
    h.update(bytes.as_ref());
    ContentDigest(hex::encode(h.finalize()))
}
