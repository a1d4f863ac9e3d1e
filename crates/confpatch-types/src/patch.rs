use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::namespace::Namespace;

/// Patch texts for a selection of changed items, grouped by namespace.
///
/// Keys are namespace patch keys ([`Namespace::patch_key`]); the default
/// namespace is stored under `"default"`. Inner keys are the changelist
/// display names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument {
    namespaces: IndexMap<String, IndexMap<String, String>>,
}

impl PatchDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Number of patches across all namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(IndexMap::len).sum()
    }

    /// Record the patch for one item.
    pub fn insert(&mut self, namespace: &Namespace, name: impl Into<String>, patch: String) {
        self.namespaces
            .entry(namespace.patch_key().to_string())
            .or_default()
            .insert(name.into(), patch);
    }

    /// Patches of one namespace by patch key.
    pub fn get(&self, patch_key: &str) -> Option<&IndexMap<String, String>> {
        self.namespaces.get(patch_key)
    }

    /// Patch text of a single item.
    pub fn patch(&self, patch_key: &str, name: &str) -> Option<&str> {
        self.get(patch_key).and_then(|m| m.get(name)).map(String::as_str)
    }

    /// Namespace patch keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, String>)> {
        self.namespaces.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only the namespaces whose patch key satisfies `keep`.
    pub fn retain_namespaces(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.namespaces.retain(|key, _| keep(key));
    }

    /// All patch texts concatenated in document order.
    pub fn concatenated(&self) -> String {
        self.namespaces
            .values()
            .flat_map(IndexMap::values)
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_namespace_uses_sentinel_key() {
        let mut doc = PatchDocument::new();
        doc.insert(&Namespace::default_namespace(), "system.site", "p1\n".into());
        assert_eq!(doc.patch("default", "system.site"), Some("p1\n"));
        assert!(doc.get("").is_none());
    }

    #[test]
    fn concatenates_in_order() {
        let mut doc = PatchDocument::new();
        doc.insert(&Namespace::default_namespace(), "a", "A\n".into());
        doc.insert(&Namespace::new("language.fr"), "b", "B\n".into());
        doc.insert(&Namespace::default_namespace(), "c", "C\n".into());
        assert_eq!(doc.concatenated(), "A\nC\nB\n");
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn retain_namespaces_filters_keys() {
        let mut doc = PatchDocument::new();
        doc.insert(&Namespace::default_namespace(), "a", "A\n".into());
        doc.insert(&Namespace::new("language.fr"), "b", "B\n".into());
        doc.retain_namespaces(|key| key == "language.fr");
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["language.fr"]);
    }
}
