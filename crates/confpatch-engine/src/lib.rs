//! Change detection and patch assembly for confpatch.
//!
//! Compares a source and a target [`ConfigStore`](confpatch_store::ConfigStore)
//! across all namespaces and turns the differences into git-applyable patches.
//!
//! # Pipeline
//!
//! 1. [`ChangeDetector`] classifies every item as created, updated, deleted
//!    or renamed, producing a [`Changelist`](confpatch_types::Changelist).
//! 2. [`ChangelistCache`] memoizes the changelist until a store changes.
//! 3. [`PatchAssembler`] wraps each item's unified diff in a git header.
//! 4. [`ConfigCompare::collect_patches`] ties these together for a
//!    [`Selection`] and returns a [`PatchDocument`](confpatch_types::PatchDocument),
//!    which a [`PatchOutput`] delivers.

pub mod assembler;
pub mod cache;
pub mod compare;
pub mod detector;
pub mod error;
pub mod output;
pub mod settings;

pub use assembler::PatchAssembler;
pub use cache::{CacheBackend, ChangelistCache, MemoryCacheBackend, CACHE_KEY, CACHE_TAG};
pub use compare::{ConfigCompare, Selection};
pub use detector::{ChangeDetector, DetectorOptions};
pub use error::{EngineError, EngineResult};
pub use output::{output_for, FileOutput, PatchOutput, TextOutput};
pub use settings::{OutputKind, PatchSettings};
