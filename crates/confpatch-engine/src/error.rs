//! Error types for the engine crate.

use confpatch_store::StoreError;
use confpatch_types::Namespace;

/// Errors that can occur while detecting changes or assembling patches.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Listing a namespace of a store failed.
    #[error("cannot list namespace {namespace}: {source}")]
    StoreList {
        namespace: Namespace,
        #[source]
        source: StoreError,
    },

    /// Reading a named item failed, or the item is missing where it must exist.
    #[error("cannot read {name} in namespace {namespace}: {source}")]
    StoreRead {
        namespace: Namespace,
        name: String,
        #[source]
        source: StoreError,
    },

    /// A rename entry does not resolve to an old item in the source and a
    /// new item in the target.
    #[error("cannot resolve rename {name} in namespace {namespace}: {reason}")]
    RenameResolution {
        namespace: Namespace,
        name: String,
        reason: String,
    },

    /// An item could not be encoded to canonical text.
    #[error("cannot serialize {name} in namespace {namespace}: {reason}")]
    Serialization {
        namespace: Namespace,
        name: String,
        reason: String,
    },

    /// A selected name is not in the changelist.
    #[error("{name} is not a pending change in namespace {namespace}")]
    UnknownSelection { namespace: Namespace, name: String },

    /// Cache backend failure.
    #[error("cache error: {0}")]
    Cache(String),

    /// Delivering patches to an output failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// Settings could not be parsed.
    #[error("invalid settings: {0}")]
    Settings(String),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
