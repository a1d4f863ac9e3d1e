//! Change classification and the ordered changelist.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::namespace::Namespace;

/// How a named item differs between the source and target stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Present in the target only.
    Create,
    /// Present in both with different serialized content.
    Update,
    /// Present in the source only.
    Delete,
    /// Deleted under one name and created under another.
    Rename,
}

impl ChangeType {
    /// Detection order within a namespace. Changelists are grouped in this
    /// order and callers rely on it.
    pub const ORDER: [ChangeType; 4] = [
        ChangeType::Create,
        ChangeType::Update,
        ChangeType::Delete,
        ChangeType::Rename,
    ];

    /// Lowercase label (`create`, `update`, `delete`, `rename`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Create => "create",
            ChangeType::Update => "update",
            ChangeType::Delete => "delete",
            ChangeType::Rename => "rename",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(ChangeType::Create),
            "update" => Ok(ChangeType::Update),
            "delete" => Ok(ChangeType::Delete),
            "rename" => Ok(ChangeType::Rename),
            other => Err(TypeError::UnknownChangeType(other.to_string())),
        }
    }
}

/// The two storage names behind a rename entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenamePair {
    /// Name in the source store.
    pub old_name: String,
    /// Name in the target store.
    pub new_name: String,
}

impl RenamePair {
    pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    /// Human-readable label, e.g. `views.view.a to views.view.b`.
    pub fn display_name(&self) -> String {
        format!("{} to {}", self.old_name, self.new_name)
    }
}

/// A single change in a changelist.
///
/// `name` is the display name. For renames it is a label and must not be used
/// as a storage key; use [`ChangeEntry::source_name`] and
/// [`ChangeEntry::target_name`] instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenamePair>,
}

impl ChangeEntry {
    /// A create, update, or delete of a single name.
    pub fn new(name: impl Into<String>, change_type: ChangeType) -> Self {
        Self {
            name: name.into(),
            change_type,
            rename: None,
        }
    }

    /// A rename from `pair.old_name` to `pair.new_name`.
    pub fn renamed(pair: RenamePair) -> Self {
        Self {
            name: pair.display_name(),
            change_type: ChangeType::Rename,
            rename: Some(pair),
        }
    }

    /// Storage name to read from the source store.
    pub fn source_name(&self) -> &str {
        match &self.rename {
            Some(pair) => &pair.old_name,
            None => &self.name,
        }
    }

    /// Storage name to read from the target store.
    pub fn target_name(&self) -> &str {
        match &self.rename {
            Some(pair) => &pair.new_name,
            None => &self.name,
        }
    }
}

/// Changes between two stores, grouped by namespace.
///
/// Both levels preserve insertion order: namespaces appear in enumeration
/// order, and entries within a namespace are grouped by [`ChangeType::ORDER`].
/// A namespace with no changes is never present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changelist {
    namespaces: IndexMap<Namespace, IndexMap<String, ChangeEntry>>,
}

impl Changelist {
    /// Create an empty changelist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes in any namespace.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Total number of entries across all namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(IndexMap::len).sum()
    }

    /// Append an entry under its display name.
    pub fn push(&mut self, namespace: &Namespace, entry: ChangeEntry) {
        self.namespaces
            .entry(namespace.clone())
            .or_default()
            .insert(entry.name.clone(), entry);
    }

    /// Namespaces with at least one change, in order.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.keys()
    }

    /// Entries of one namespace, keyed by display name.
    pub fn get(&self, namespace: &Namespace) -> Option<&IndexMap<String, ChangeEntry>> {
        self.namespaces.get(namespace)
    }

    /// Look up a single entry by namespace and display name.
    pub fn entry(&self, namespace: &Namespace, name: &str) -> Option<&ChangeEntry> {
        self.namespaces.get(namespace).and_then(|m| m.get(name))
    }

    /// Iterate namespaces and their entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Namespace, &IndexMap<String, ChangeEntry>)> {
        self.namespaces.iter()
    }

    /// Number of entries of the given type.
    pub fn count(&self, change_type: ChangeType) -> usize {
        self.namespaces
            .values()
            .flat_map(IndexMap::values)
            .filter(|e| e.change_type == change_type)
            .count()
    }
}
