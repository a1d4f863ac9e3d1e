use confpatch_types::Namespace;

/// A mutation of a configuration store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// An item was created or updated.
    Saved { namespace: Namespace, name: String },
    /// An item was removed.
    Deleted { namespace: Namespace, name: String },
    /// An item moved to a new name within its namespace.
    Renamed {
        namespace: Namespace,
        old_name: String,
        new_name: String,
    },
}

impl StoreEvent {
    pub fn namespace(&self) -> &Namespace {
        match self {
            StoreEvent::Saved { namespace, .. }
            | StoreEvent::Deleted { namespace, .. }
            | StoreEvent::Renamed { namespace, .. } => namespace,
        }
    }
}

/// Receives store mutation events.
///
/// Listeners are called synchronously after the mutation is applied and must
/// not call back into the store that emitted the event.
pub trait StoreListener: Send + Sync {
    fn on_store_event(&self, event: &StoreEvent);
}
