//! Store-level change detection: compare two stores namespace by namespace.
//!
//! Items are compared by their encoded text, never structurally. A deleted
//! item and a created item in the same namespace are reported as a single
//! rename when the stores give them the same rename identity.

use std::collections::HashSet;
use std::sync::Arc;

use confpatch_store::{ConfigStore, Encoder, StoreError};
use confpatch_types::{ChangeEntry, ChangeType, Changelist, Namespace, RenamePair};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

/// Tunables for change detection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Only pair a delete with a create as a rename when both items encode to
    /// identical text. When `false`, matching identities alone suffice and the
    /// rename patch carries the content changes.
    pub rename_requires_identical_content: bool,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            rename_requires_identical_content: true,
        }
    }
}

/// Computes the [`Changelist`] between a source and a target store.
#[derive(Clone)]
pub struct ChangeDetector {
    encoder: Arc<dyn Encoder>,
    options: DetectorOptions,
}

impl ChangeDetector {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self::with_options(encoder, DetectorOptions::default())
    }

    pub fn with_options(encoder: Arc<dyn Encoder>, options: DetectorOptions) -> Self {
        Self { encoder, options }
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Compare every namespace present in either store.
    ///
    /// Within a namespace, entries are grouped create, update, delete, rename;
    /// inside each group they follow store enumeration order.
    pub fn detect(
        &self,
        source: &dyn ConfigStore,
        target: &dyn ConfigStore,
    ) -> EngineResult<Changelist> {
        let mut changelist = Changelist::new();
        for namespace in all_namespaces(source, target)? {
            let changes = self.detect_namespace(source, target, &namespace)?;
            debug!(
                namespace = %namespace,
                changes = changes.len(),
                "compared namespace"
            );
            for entry in changes {
                changelist.push(&namespace, entry);
            }
        }
        info!(
            namespaces = changelist.namespaces().count(),
            changes = changelist.len(),
            "change detection complete"
        );
        Ok(changelist)
    }

    fn detect_namespace(
        &self,
        source: &dyn ConfigStore,
        target: &dyn ConfigStore,
        namespace: &Namespace,
    ) -> EngineResult<Vec<ChangeEntry>> {
        let source_names = list_names(source, namespace)?;
        let target_names = list_names(target, namespace)?;
        let source_set: HashSet<&str> = source_names.iter().map(String::as_str).collect();
        let target_set: HashSet<&str> = target_names.iter().map(String::as_str).collect();

        let mut created: Vec<&str> = target_names
            .iter()
            .map(String::as_str)
            .filter(|name| !source_set.contains(name))
            .collect();

        let mut updated = Vec::new();
        let mut deleted = Vec::new();
        for name in &source_names {
            if target_set.contains(name.as_str()) {
                let old = self.encoded(source, namespace, name)?;
                let new = self.encoded(target, namespace, name)?;
                if old != new {
                    updated.push(name.as_str());
                }
            } else {
                deleted.push(name.as_str());
            }
        }

        let renamed = self.pair_renames(source, target, namespace, &mut deleted, &mut created)?;

        let mut entries = Vec::with_capacity(created.len() + updated.len() + deleted.len() + renamed.len());
        entries.extend(created.into_iter().map(|n| ChangeEntry::new(n, ChangeType::Create)));
        entries.extend(updated.into_iter().map(|n| ChangeEntry::new(n, ChangeType::Update)));
        entries.extend(deleted.into_iter().map(|n| ChangeEntry::new(n, ChangeType::Delete)));
        entries.extend(renamed.into_iter().map(ChangeEntry::renamed));
        Ok(entries)
    }

    /// Match deletes with creates sharing a rename identity. Matched names are
    /// removed from both lists. Each create pairs with at most one delete, the
    /// first in source order.
    fn pair_renames(
        &self,
        source: &dyn ConfigStore,
        target: &dyn ConfigStore,
        namespace: &Namespace,
        deleted: &mut Vec<&str>,
        created: &mut Vec<&str>,
    ) -> EngineResult<Vec<RenamePair>> {
        if deleted.is_empty() || created.is_empty() {
            return Ok(Vec::new());
        }

        let mut create_ids = Vec::with_capacity(created.len());
        for name in created.iter() {
            create_ids.push(identity(target, namespace, name)?);
        }

        let mut pairs = Vec::new();
        let mut matched_deletes = HashSet::new();
        let mut matched_creates = HashSet::new();
        for (di, old_name) in deleted.iter().enumerate() {
            let Some(id) = identity(source, namespace, old_name)? else {
                continue;
            };
            for (ci, new_name) in created.iter().enumerate() {
                if matched_creates.contains(&ci) || create_ids[ci].as_deref() != Some(id.as_str()) {
                    continue;
                }
                if self.options.rename_requires_identical_content
                    && self.encoded(source, namespace, old_name)?
                        != self.encoded(target, namespace, new_name)?
                {
                    continue;
                }
                pairs.push(RenamePair::new(*old_name, *new_name));
                matched_deletes.insert(di);
                matched_creates.insert(ci);
                break;
            }
        }

        let mut di = 0;
        deleted.retain(|_| {
            let keep = !matched_deletes.contains(&di);
            di += 1;
            keep
        });
        let mut ci = 0;
        created.retain(|_| {
            let keep = !matched_creates.contains(&ci);
            ci += 1;
            keep
        });
        Ok(pairs)
    }

    /// Encoded text of an item that the store listed and therefore must exist.
    fn encoded(
        &self,
        store: &dyn ConfigStore,
        namespace: &Namespace,
        name: &str,
    ) -> EngineResult<String> {
        let item = store
            .read(namespace, name)
            .map_err(|source| read_error(namespace, name, source))?
            .ok_or_else(|| {
                read_error(
                    namespace,
                    name,
                    StoreError::NotFound {
                        namespace: namespace.clone(),
                        name: name.to_string(),
                    },
                )
            })?;
        self.encoder
            .encode(&item)
            .map_err(|e| EngineError::Serialization {
                namespace: namespace.clone(),
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

impl std::fmt::Debug for ChangeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeDetector")
            .field("options", &self.options)
            .finish()
    }
}

/// Default namespace first, then source namespaces, then target-only ones.
fn all_namespaces(source: &dyn ConfigStore, target: &dyn ConfigStore) -> EngineResult<Vec<Namespace>> {
    let default = Namespace::default_namespace();
    let list = |store: &dyn ConfigStore| {
        store.list_namespaces().map_err(|source| EngineError::StoreList {
            namespace: default.clone(),
            source,
        })
    };

    let mut namespaces = vec![default.clone()];
    for namespace in list(source)?.into_iter().chain(list(target)?) {
        if !namespaces.contains(&namespace) {
            namespaces.push(namespace);
        }
    }
    Ok(namespaces)
}

fn list_names(store: &dyn ConfigStore, namespace: &Namespace) -> EngineResult<Vec<String>> {
    store
        .list_names(namespace)
        .map_err(|source| EngineError::StoreList {
            namespace: namespace.clone(),
            source,
        })
}

fn identity(store: &dyn ConfigStore, namespace: &Namespace, name: &str) -> EngineResult<Option<String>> {
    store
        .rename_identity(namespace, name)
        .map_err(|source| read_error(namespace, name, source))
}

fn read_error(namespace: &Namespace, name: &str, source: StoreError) -> EngineError {
    EngineError::StoreRead {
        namespace: namespace.clone(),
        name: name.to_string(),
        source,
    }
}
