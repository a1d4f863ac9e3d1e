use std::fmt;

use serde::{Deserialize, Serialize};

/// Key under which the default namespace is stored in a [`PatchDocument`].
///
/// [`PatchDocument`]: crate::PatchDocument
pub const DEFAULT_PATCH_KEY: &str = "default";

/// Identifier of an isolated sub-store ("collection") of configuration items.
///
/// The default namespace is the empty string. Non-default namespaces are
/// dot-separated (`language.fr`) and map onto nested directories when
/// rendered as file paths.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// The default namespace.
    pub const fn default_namespace() -> Self {
        Self(String::new())
    }

    /// Create a namespace from its identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns `true` for the default (empty) namespace.
    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Relative directory for this namespace's files: dots become `/`, and the
    /// default namespace has no segment at all.
    pub fn path_segment(&self) -> String {
        self.0.replace('.', "/")
    }

    /// Key used for this namespace in a patch document.
    pub fn patch_key(&self) -> &str {
        if self.is_default() {
            DEFAULT_PATCH_KEY
        } else {
            &self.0
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({:?})", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("<default>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let ns = Namespace::default_namespace();
        assert!(ns.is_default());
        assert_eq!(ns, Namespace::default());
        assert_eq!(ns.as_str(), "");
    }

    #[test]
    fn path_segment_converts_dots() {
        assert_eq!(Namespace::new("block.block.x").path_segment(), "block/block/x");
        assert_eq!(Namespace::default_namespace().path_segment(), "");
    }

    #[test]
    fn patch_key_uses_sentinel_for_default() {
        assert_eq!(Namespace::default_namespace().patch_key(), "default");
        assert_eq!(Namespace::new("language.fr").patch_key(), "language.fr");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Namespace::new("language.fr")).unwrap();
        assert_eq!(json, "\"language.fr\"");
    }
}
