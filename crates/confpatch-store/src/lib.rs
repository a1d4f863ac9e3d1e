//! Configuration store contract for confpatch.
//!
//! A configuration store is a hierarchical, namespaced key-value repository:
//! each [`Namespace`](confpatch_types::Namespace) holds an independent set of
//! named [`ConfigItem`]s. The diff engine only ever reads from a store; the
//! mutating methods on [`InMemoryConfigStore`] exist for hosts and tests.
//!
//! # Storage Backends
//!
//! All backends implement the [`ConfigStore`] trait:
//!
//! - [`InMemoryConfigStore`] -- ordered map store that notifies listeners on mutation
//! - [`FileConfigStore`] -- directory of YAML files, one subdirectory per namespace
//!
//! # Encoding
//!
//! Items are compared and diffed by their canonical text, produced by an
//! [`Encoder`]. [`YamlEncoder`] is the standard implementation.

pub mod encoder;
pub mod error;
pub mod events;
pub mod file;
pub mod item;
pub mod memory;
pub mod traits;

pub use encoder::{Encoder, YamlEncoder};
pub use error::{StoreError, StoreResult};
pub use events::{StoreEvent, StoreListener};
pub use file::FileConfigStore;
pub use item::ConfigItem;
pub use memory::InMemoryConfigStore;
pub use traits::ConfigStore;
