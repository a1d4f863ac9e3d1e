//! Foundation types for confpatch.
//!
//! This crate provides the data model shared by every other confpatch crate:
//! the identity of a configuration namespace, the change classification
//! produced when two stores are compared, and the per-namespace patch
//! documents produced from a changelist.
//!
//! # Key Types
//!
//! - [`Namespace`] — Isolated sub-store identifier (the default is `""`)
//! - [`ChangeType`] / [`ChangeEntry`] — Classification of a single item change
//! - [`Changelist`] — Ordered changes grouped by namespace
//! - [`PatchDocument`] — Patch texts grouped by namespace key
//! - [`ContentHash`] — Git-style abbreviated SHA-1 of serialized content

pub mod change;
pub mod error;
pub mod hash;
pub mod namespace;
pub mod patch;

pub use change::{ChangeEntry, ChangeType, Changelist, RenamePair};
pub use error::TypeError;
pub use hash::ContentHash;
pub use namespace::Namespace;
pub use patch::PatchDocument;
