use confpatch_types::Namespace;

use crate::error::StoreResult;
use crate::item::ConfigItem;

/// Read contract of a namespaced configuration store.
///
/// Every store has the default namespace; [`list_namespaces`] reports the
/// others. All implementations must satisfy these invariants:
/// - Enumeration order is stable: listing twice without an intervening
///   mutation returns the same sequence.
/// - `read` returns `Ok(None)` for a missing item and `Err` only on failure.
/// - All I/O errors are propagated, never silently ignored.
///
/// [`list_namespaces`]: ConfigStore::list_namespaces
pub trait ConfigStore: Send + Sync {
    /// Non-default namespaces holding at least one item.
    fn list_namespaces(&self) -> StoreResult<Vec<Namespace>>;

    /// Item names in one namespace, in enumeration order.
    fn list_names(&self, namespace: &Namespace) -> StoreResult<Vec<String>>;

    /// Read an item by name.
    fn read(&self, namespace: &Namespace, name: &str) -> StoreResult<Option<ConfigItem>>;

    /// Check whether an item exists.
    fn exists(&self, namespace: &Namespace, name: &str) -> StoreResult<bool> {
        Ok(self.read(namespace, name)?.is_some())
    }

    /// Stable identity of an item across renames.
    ///
    /// A deleted and a created item sharing an identity form a rename pair.
    /// The default implementation uses the item's `uuid` key; backends with
    /// native rename tracking override it.
    fn rename_identity(&self, namespace: &Namespace, name: &str) -> StoreResult<Option<String>> {
        Ok(self
            .read(namespace, name)?
            .and_then(|item| item.identity().map(str::to_string)))
    }
}
