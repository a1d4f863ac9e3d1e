use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::TypeError;

/// Number of hex characters in an abbreviated hash.
pub const SHORT_HASH_LEN: usize = 7;

/// SHA-1 digest of a configuration item's serialized text.
///
/// Absent or empty content has no digest and renders as git's all-zero
/// abbreviation (`0000000`), which is what `git apply` expects on the missing
/// side of a created or deleted file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash(Option<[u8; 20]>);

impl ContentHash {
    /// Hash of absent content.
    pub const fn absent() -> Self {
        Self(None)
    }

    /// Hash the given text. `None` and `""` both produce the absent hash.
    pub fn of(text: Option<&str>) -> Self {
        match text {
            Some(text) if !text.is_empty() => {
                let digest = Sha1::digest(text.as_bytes());
                Self(Some(digest.into()))
            }
            _ => Self(None),
        }
    }

    /// Returns `true` if this is the hash of absent content.
    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    /// Full 40-character hex digest, or forty zeros when absent.
    pub fn to_hex(&self) -> String {
        match &self.0 {
            Some(bytes) => hex::encode(bytes),
            None => "0".repeat(40),
        }
    }

    /// Abbreviated 7-character form used in `index` lines.
    pub fn short_hex(&self) -> String {
        let mut full = self.to_hex();
        full.truncate(SHORT_HASH_LEN);
        full
    }

    /// Parse from a full 40-character hex string. All zeros parses as absent.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 20 {
            return Err(TypeError::InvalidLength {
                expected: 20,
                actual: bytes.len(),
            });
        }
        if bytes.iter().all(|b| *b == 0) {
            return Ok(Self(None));
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(Some(arr)))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_hex())
    }
}
