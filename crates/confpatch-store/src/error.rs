use std::path::PathBuf;

use confpatch_types::Namespace;

/// Errors from configuration store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested item does not exist.
    #[error("item not found: {name} in namespace {namespace}")]
    NotFound { namespace: Namespace, name: String },

    /// A stored file could not be parsed into an item.
    #[error("cannot parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// An item could not be encoded to canonical text.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The item or namespace name cannot be used as a storage key.
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A lock guarding in-memory state was poisoned.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
