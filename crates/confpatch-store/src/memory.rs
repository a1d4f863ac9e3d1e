use std::sync::{Arc, RwLock};

use confpatch_types::Namespace;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::events::{StoreEvent, StoreListener};
use crate::item::ConfigItem;
use crate::traits::ConfigStore;

type Items = IndexMap<Namespace, IndexMap<String, ConfigItem>>;

/// In-memory, ordered configuration store.
///
/// Intended for tests and embedding. Enumeration order is insertion order;
/// deleting an item keeps the relative order of the rest, and renaming moves
/// the item to the end of its namespace. Every mutation is reported to the
/// subscribed [`StoreListener`]s after the write lock is released.
pub struct InMemoryConfigStore {
    items: RwLock<Items>,
    listeners: RwLock<Vec<Arc<dyn StoreListener>>>,
}

impl InMemoryConfigStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(IndexMap::new()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener for subsequent mutations.
    pub fn subscribe(&self, listener: Arc<dyn StoreListener>) -> StoreResult<()> {
        self.listeners
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .push(listener);
        Ok(())
    }

    /// Create or replace an item.
    pub fn write(&self, namespace: &Namespace, name: &str, item: ConfigItem) -> StoreResult<()> {
        validate_name(name)?;
        {
            let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
            items
                .entry(namespace.clone())
                .or_default()
                .insert(name.to_string(), item);
        }
        self.emit(StoreEvent::Saved {
            namespace: namespace.clone(),
            name: name.to_string(),
        })
    }

    /// Remove an item. Returns `true` if it existed.
    pub fn delete(&self, namespace: &Namespace, name: &str) -> StoreResult<bool> {
        let removed = {
            let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
            let removed = match items.get_mut(namespace) {
                Some(names) => names.shift_remove(name).is_some(),
                None => false,
            };
            if items.get(namespace).is_some_and(IndexMap::is_empty) {
                items.shift_remove(namespace);
            }
            removed
        };
        if removed {
            self.emit(StoreEvent::Deleted {
                namespace: namespace.clone(),
                name: name.to_string(),
            })?;
        }
        Ok(removed)
    }

    /// Move an item to a new name within its namespace.
    pub fn rename(&self, namespace: &Namespace, old_name: &str, new_name: &str) -> StoreResult<()> {
        validate_name(new_name)?;
        {
            let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
            let names = items.get_mut(namespace).ok_or_else(|| StoreError::NotFound {
                namespace: namespace.clone(),
                name: old_name.to_string(),
            })?;
            let item = names.shift_remove(old_name).ok_or_else(|| StoreError::NotFound {
                namespace: namespace.clone(),
                name: old_name.to_string(),
            })?;
            names.insert(new_name.to_string(), item);
        }
        self.emit(StoreEvent::Renamed {
            namespace: namespace.clone(),
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        })
    }

    /// Number of items across all namespaces.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .map(|items| items.values().map(IndexMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn emit(&self, event: StoreEvent) -> StoreResult<()> {
        debug!(namespace = %event.namespace(), ?event, "store mutated");
        let listeners = self.listeners.read().map_err(|_| StoreError::Poisoned)?;
        for listener in listeners.iter() {
            listener.on_store_event(&event);
        }
        Ok(())
    }
}

impl Default for InMemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn list_namespaces(&self) -> StoreResult<Vec<Namespace>> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(items
            .iter()
            .filter(|(ns, names)| !ns.is_default() && !names.is_empty())
            .map(|(ns, _)| ns.clone())
            .collect())
    }

    fn list_names(&self, namespace: &Namespace) -> StoreResult<Vec<String>> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(items
            .get(namespace)
            .map(|names| names.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn read(&self, namespace: &Namespace, name: &str) -> StoreResult<Option<ConfigItem>> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(items.get(namespace).and_then(|names| names.get(name)).cloned())
    }
}

impl std::fmt::Debug for InMemoryConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryConfigStore")
            .field("item_count", &self.len())
            .finish()
    }
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() || name.contains('/') || name.contains('\0') {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<StoreEvent>>,
    }

    impl StoreListener for Recorder {
        fn on_store_event(&self, event: &StoreEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn item(value: &str) -> ConfigItem {
        ConfigItem::new().with("value", value)
    }

    #[test]
    fn write_and_read() {
        let store = InMemoryConfigStore::new();
        let ns = Namespace::default_namespace();
        store.write(&ns, "system.site", item("x")).unwrap();

        let read_back = store.read(&ns, "system.site").unwrap().expect("should exist");
        assert_eq!(read_back, item("x"));
        assert!(store.exists(&ns, "system.site").unwrap());
        assert!(store.read(&ns, "missing").unwrap().is_none());
    }

    #[test]
    fn list_names_in_insertion_order() {
        let store = InMemoryConfigStore::new();
        let ns = Namespace::default_namespace();
        store.write(&ns, "zeta", item("1")).unwrap();
        store.write(&ns, "alpha", item("2")).unwrap();
        store.write(&ns, "mid", item("3")).unwrap();
        assert_eq!(store.list_names(&ns).unwrap(), vec!["zeta", "alpha", "mid"]);

        store.delete(&ns, "alpha").unwrap();
        assert_eq!(store.list_names(&ns).unwrap(), vec!["zeta", "mid"]);
    }

    #[test]
    fn list_namespaces_excludes_default_and_empty() {
        let store = InMemoryConfigStore::new();
        store.write(&Namespace::default_namespace(), "a", item("1")).unwrap();
        store.write(&Namespace::new("language.fr"), "b", item("2")).unwrap();
        store.write(&Namespace::new("language.de"), "c", item("3")).unwrap();
        store.delete(&Namespace::new("language.de"), "c").unwrap();

        assert_eq!(
            store.list_namespaces().unwrap(),
            vec![Namespace::new("language.fr")]
        );
    }

    #[test]
    fn rename_moves_item() {
        let store = InMemoryConfigStore::new();
        let ns = Namespace::default_namespace();
        store.write(&ns, "old", item("1")).unwrap();
        store.write(&ns, "other", item("2")).unwrap();
        store.rename(&ns, "old", "new").unwrap();

        assert!(store.read(&ns, "old").unwrap().is_none());
        assert_eq!(store.read(&ns, "new").unwrap(), Some(item("1")));
        assert_eq!(store.list_names(&ns).unwrap(), vec!["other", "new"]);
    }

    #[test]
    fn rename_missing_item_fails() {
        let store = InMemoryConfigStore::new();
        let err = store
            .rename(&Namespace::default_namespace(), "nope", "new")
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn rejects_invalid_names() {
        let store = InMemoryConfigStore::new();
        let ns = Namespace::default_namespace();
        assert!(matches!(
            store.write(&ns, "", item("1")),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.write(&ns, "a/b", item("1")),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn listeners_receive_every_mutation() {
        let store = InMemoryConfigStore::new();
        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone()).unwrap();
        let ns = Namespace::new("language.fr");

        store.write(&ns, "a", item("1")).unwrap();
        store.rename(&ns, "a", "b").unwrap();
        store.delete(&ns, "b").unwrap();
        // Deleting a missing item is not a mutation.
        store.delete(&ns, "b").unwrap();

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], StoreEvent::Saved { name, .. } if name == "a"));
        assert!(matches!(
            &events[1],
            StoreEvent::Renamed { old_name, new_name, .. } if old_name == "a" && new_name == "b"
        ));
        assert!(matches!(&events[2], StoreEvent::Deleted { name, .. } if name == "b"));
        assert_eq!(events[0].namespace(), &ns);
    }

    #[test]
    fn rename_identity_from_uuid() {
        let store = InMemoryConfigStore::new();
        let ns = Namespace::default_namespace();
        store
            .write(&ns, "view.front", ConfigItem::new().with("uuid", "u-1"))
            .unwrap();
        store.write(&ns, "plain", item("x")).unwrap();

        assert_eq!(
            store.rename_identity(&ns, "view.front").unwrap(),
            Some("u-1".to_string())
        );
        assert_eq!(store.rename_identity(&ns, "plain").unwrap(), None);
        assert_eq!(store.rename_identity(&ns, "missing").unwrap(), None);
    }
}
