//! Store comparison facade: cached changelist plus patch collection.

use std::sync::Arc;

use confpatch_store::{ConfigStore, Encoder, StoreError, YamlEncoder};
use confpatch_types::{ChangeEntry, ChangeType, Changelist, Namespace, PatchDocument};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::assembler::PatchAssembler;
use crate::cache::ChangelistCache;
use crate::detector::ChangeDetector;
use crate::error::{EngineError, EngineResult};
use crate::settings::PatchSettings;

/// Items chosen for export, per namespace.
///
/// A namespace that is absent, or present with no names, selects every
/// change in that namespace. Names are changelist display names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    names: IndexMap<Namespace, Vec<String>>,
}

impl Selection {
    /// Select every change.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn include(mut self, namespace: &Namespace, name: impl Into<String>) -> Self {
        self.names
            .entry(namespace.clone())
            .or_default()
            .push(name.into());
        self
    }

    /// Explicitly chosen names in `namespace`, ignoring blank entries.
    /// `None` means every change in the namespace.
    pub fn names(&self, namespace: &Namespace) -> Option<Vec<&str>> {
        let names: Vec<&str> = self
            .names
            .get(namespace)?
            .iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .collect();
        (!names.is_empty()).then_some(names)
    }
}

/// Compares a source store against a target store.
///
/// The changelist comes from the shared [`ChangelistCache`]; patches are
/// always built from fresh store reads.
pub struct ConfigCompare {
    source: Arc<dyn ConfigStore>,
    target: Arc<dyn ConfigStore>,
    encoder: Arc<dyn Encoder>,
    detector: ChangeDetector,
    assembler: PatchAssembler,
    cache: Arc<ChangelistCache>,
}

impl ConfigCompare {
    /// Compare with the YAML encoder and a private in-memory cache.
    pub fn new(
        source: Arc<dyn ConfigStore>,
        target: Arc<dyn ConfigStore>,
        settings: &PatchSettings,
    ) -> Self {
        let encoder: Arc<dyn Encoder> = Arc::new(YamlEncoder);
        Self {
            source,
            target,
            detector: ChangeDetector::with_options(encoder.clone(), settings.detector.clone()),
            encoder,
            assembler: settings.assembler(),
            cache: Arc::new(ChangelistCache::in_memory()),
        }
    }

    /// Share a cache, usually one subscribed to store events.
    pub fn with_cache(mut self, cache: Arc<ChangelistCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.detector = ChangeDetector::with_options(encoder.clone(), self.detector.options().clone());
        self.encoder = encoder;
        self
    }

    pub fn cache(&self) -> &Arc<ChangelistCache> {
        &self.cache
    }

    pub fn assembler(&self) -> &PatchAssembler {
        &self.assembler
    }

    /// Current changelist, from cache when available.
    pub fn changelist(&self) -> EngineResult<Changelist> {
        self.cache
            .get_changelist(&self.detector, self.source.as_ref(), self.target.as_ref())
    }

    /// Build patches for the selected changes.
    ///
    /// Every selected name must be a pending change. Namespaces without
    /// selected changes are absent from the result.
    pub fn collect_patches(&self, selection: &Selection) -> EngineResult<PatchDocument> {
        let changes = self.changelist()?;
        let mut document = PatchDocument::new();

        for (namespace, entries) in changes.iter() {
            let names: Vec<&str> = match selection.names(namespace) {
                Some(names) => names,
                None => entries.keys().map(String::as_str).collect(),
            };
            for name in names {
                let entry = entries.get(name).ok_or_else(|| EngineError::UnknownSelection {
                    namespace: namespace.clone(),
                    name: name.to_string(),
                })?;
                let (source, target) = self.texts(namespace, entry)?;
                let patch = self.assembler.assemble(
                    entry,
                    namespace,
                    source.as_deref(),
                    target.as_deref(),
                );
                debug!(namespace = %namespace, name, kind = %entry.change_type, "assembled patch");
                document.insert(namespace, name, patch);
            }
        }

        info!(
            namespaces = document.len(),
            patches = document.iter().map(|(_, p)| p.len()).sum::<usize>(),
            "collected patches"
        );
        Ok(document)
    }

    /// Form key for a namespace's selection list: `list` for the default
    /// namespace, `list_<namespace>` otherwise with every run of characters
    /// outside `[a-z0-9_]` replaced by `_`.
    pub fn list_key(namespace: &Namespace) -> String {
        if namespace.is_default() {
            return "list".to_string();
        }
        let mut key = String::from("list_");
        let mut in_run = false;
        for c in namespace.as_str().chars() {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                key.push(c);
                in_run = false;
            } else if !in_run {
                key.push('_');
                in_run = true;
            }
        }
        key
    }

    /// Encoded source and target texts for an entry. The side a change type
    /// says must exist is required; the other side is `None`.
    fn texts(
        &self,
        namespace: &Namespace,
        entry: &ChangeEntry,
    ) -> EngineResult<(Option<String>, Option<String>)> {
        match entry.change_type {
            ChangeType::Create => Ok((None, Some(self.required(&*self.target, namespace, &entry.name)?))),
            ChangeType::Delete => Ok((Some(self.required(&*self.source, namespace, &entry.name)?), None)),
            ChangeType::Update => Ok((
                Some(self.required(&*self.source, namespace, &entry.name)?),
                Some(self.required(&*self.target, namespace, &entry.name)?),
            )),
            ChangeType::Rename => {
                let pair = entry.rename.as_ref().ok_or_else(|| EngineError::RenameResolution {
                    namespace: namespace.clone(),
                    name: entry.name.clone(),
                    reason: "entry carries no old/new name pair".to_string(),
                })?;
                let old = self
                    .optional(&*self.source, namespace, &pair.old_name)?
                    .ok_or_else(|| EngineError::RenameResolution {
                        namespace: namespace.clone(),
                        name: entry.name.clone(),
                        reason: format!("{} is missing from the source store", pair.old_name),
                    })?;
                let new = self
                    .optional(&*self.target, namespace, &pair.new_name)?
                    .ok_or_else(|| EngineError::RenameResolution {
                        namespace: namespace.clone(),
                        name: entry.name.clone(),
                        reason: format!("{} is missing from the target store", pair.new_name),
                    })?;
                Ok((Some(old), Some(new)))
            }
        }
    }

    fn required(&self, store: &dyn ConfigStore, namespace: &Namespace, name: &str) -> EngineResult<String> {
        self.optional(store, namespace, name)?
            .ok_or_else(|| EngineError::StoreRead {
                namespace: namespace.clone(),
                name: name.to_string(),
                source: StoreError::NotFound {
                    namespace: namespace.clone(),
                    name: name.to_string(),
                },
            })
    }

    fn optional(
        &self,
        store: &dyn ConfigStore,
        namespace: &Namespace,
        name: &str,
    ) -> EngineResult<Option<String>> {
        let item = store
            .read(namespace, name)
            .map_err(|source| EngineError::StoreRead {
                namespace: namespace.clone(),
                name: name.to_string(),
                source,
            })?;
        item.map(|item| {
            self.encoder
                .encode(&item)
                .map_err(|e| EngineError::Serialization {
                    namespace: namespace.clone(),
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        })
        .transpose()
    }
}

impl std::fmt::Debug for ConfigCompare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCompare")
            .field("detector", &self.detector)
            .field("assembler", &self.assembler)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confpatch_store::{ConfigItem, InMemoryConfigStore};

    fn ns() -> Namespace {
        Namespace::default_namespace()
    }

    fn fixture() -> (Arc<InMemoryConfigStore>, Arc<InMemoryConfigStore>, ConfigCompare) {
        let source = Arc::new(InMemoryConfigStore::new());
        let target = Arc::new(InMemoryConfigStore::new());
        source.write(&ns(), "changed", ConfigItem::new().with("v", "1")).unwrap();
        target.write(&ns(), "changed", ConfigItem::new().with("v", "2")).unwrap();
        target.write(&ns(), "added", ConfigItem::new().with("v", "3")).unwrap();
        let compare = ConfigCompare::new(source.clone(), target.clone(), &PatchSettings::default());
        (source, target, compare)
    }

    #[test]
    fn list_keys() {
        assert_eq!(ConfigCompare::list_key(&ns()), "list");
        assert_eq!(ConfigCompare::list_key(&Namespace::new("language.fr")), "list_language_fr");
        assert_eq!(ConfigCompare::list_key(&Namespace::new("Lang..x-y")), "list__ang_x_y");
    }

    #[test]
    fn selection_blank_names_mean_all() {
        let selection = Selection::all().include(&ns(), "");
        assert_eq!(selection.names(&ns()), None);
        let selection = selection.include(&ns(), "a");
        assert_eq!(selection.names(&ns()), Some(vec!["a"]));
    }

    #[test]
    fn collects_every_change_by_default() {
        let (_, _, compare) = fixture();
        let doc = compare.collect_patches(&Selection::all()).unwrap();
        let names: Vec<&String> = doc.get("default").unwrap().keys().collect();
        assert_eq!(names, vec!["added", "changed"]);
    }

    #[test]
    fn selection_limits_patches() {
        let (_, _, compare) = fixture();
        let doc = compare
            .collect_patches(&Selection::all().include(&ns(), "changed"))
            .unwrap();
        assert_eq!(doc.len(), 1);
        let patch = doc.patch("default", "changed").unwrap();
        assert!(patch.starts_with("diff --git a/changed.yml b/changed.yml\n"));
        assert!(patch.contains("-v: '1'\n") || patch.contains("-v: \"1\"\n"));
        assert!(doc.patch("default", "added").is_none());
    }

    #[test]
    fn unknown_selection_fails() {
        let (_, _, compare) = fixture();
        let err = compare
            .collect_patches(&Selection::all().include(&ns(), "nope"))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownSelection { name, .. } if name == "nope"));
    }

    #[test]
    fn stale_cache_entry_fails_with_item_name() {
        let (_, target, compare) = fixture();
        compare.changelist().unwrap();
        // Mutation without invalidation leaves the cached create dangling.
        target.delete(&ns(), "added").unwrap();
        let err = compare.collect_patches(&Selection::all()).unwrap_err();
        assert!(matches!(err, EngineError::StoreRead { name, .. } if name == "added"));
    }

    #[test]
    fn dangling_rename_fails_with_resolution_error() {
        let source = Arc::new(InMemoryConfigStore::new());
        let target = Arc::new(InMemoryConfigStore::new());
        let item = ConfigItem::new().with("uuid", "u").with("v", "x");
        source.write(&ns(), "old", item.clone()).unwrap();
        target.write(&ns(), "new", item).unwrap();
        let compare = ConfigCompare::new(source, target.clone(), &PatchSettings::default());
        assert_eq!(compare.changelist().unwrap().count(ChangeType::Rename), 1);

        target.delete(&ns(), "new").unwrap();
        let err = compare.collect_patches(&Selection::all()).unwrap_err();
        match err {
            EngineError::RenameResolution { name, reason, .. } => {
                assert_eq!(name, "old to new");
                assert!(reason.contains("new"));
            }
            other => panic!("expected RenameResolution, got {other:?}"),
        }
    }

    struct RejectingEncoder;

    impl Encoder for RejectingEncoder {
        fn encode(&self, _: &ConfigItem) -> confpatch_store::StoreResult<String> {
            Err(StoreError::Serialization("cannot encode".into()))
        }
    }

    #[test]
    fn encoder_failure_while_collecting_names_item() {
        let source = Arc::new(InMemoryConfigStore::new());
        let target = Arc::new(InMemoryConfigStore::new());
        let fr = Namespace::new("language.fr");
        target.write(&fr, "added", ConfigItem::new().with("v", "1")).unwrap();
        let compare = ConfigCompare::new(source, target, &PatchSettings::default())
            .with_encoder(Arc::new(RejectingEncoder));

        // A lone create is detected without encoding anything.
        assert_eq!(compare.changelist().unwrap().count(ChangeType::Create), 1);
        let err = compare.collect_patches(&Selection::all()).unwrap_err();
        match err {
            EngineError::Serialization { namespace, name, reason } => {
                assert_eq!(namespace, fr);
                assert_eq!(name, "added");
                assert!(reason.contains("cannot encode"));
            }
            other => panic!("expected Serialization, got {other:?}"),
        }
    }
}
