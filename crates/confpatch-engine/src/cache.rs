//! Memoized changelists.
//!
//! The changelist is stored under a fixed key and tag and lives until the tag
//! is invalidated. Invalidation is pushed in by the host, typically by
//! subscribing the cache to store mutation events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use confpatch_store::{ConfigStore, StoreEvent, StoreListener};
use confpatch_types::Changelist;
use tracing::{debug, warn};

use crate::detector::ChangeDetector;
use crate::error::{EngineError, EngineResult};

/// Key under which the changelist is cached.
pub const CACHE_KEY: &str = "config_patch_changes";

/// Invalidation tag attached to the cached changelist.
pub const CACHE_TAG: &str = "config_patch";

/// Storage behind a [`ChangelistCache`].
///
/// Entries never expire on their own; they are removed only through
/// [`invalidate_tags`](CacheBackend::invalidate_tags).
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> EngineResult<Option<Changelist>>;

    fn set(&self, key: &str, value: Changelist, tags: &[&str]) -> EngineResult<()>;

    /// Drop every entry carrying any of `tags`.
    fn invalidate_tags(&self, tags: &[&str]) -> EngineResult<()>;
}

struct CachedEntry {
    value: Changelist,
    tags: Vec<String>,
}

/// Process-local cache backend.
#[derive(Default)]
pub struct MemoryCacheBackend {
    entries: RwLock<HashMap<String, CachedEntry>>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBackend for MemoryCacheBackend {
    fn get(&self, key: &str) -> EngineResult<Option<Changelist>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| EngineError::Cache(format!("lock poisoned: {e}")))?;
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: Changelist, tags: &[&str]) -> EngineResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| EngineError::Cache(format!("lock poisoned: {e}")))?;
        entries.insert(
            key.to_string(),
            CachedEntry {
                value,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        );
        Ok(())
    }

    fn invalidate_tags(&self, tags: &[&str]) -> EngineResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| EngineError::Cache(format!("lock poisoned: {e}")))?;
        entries.retain(|_, entry| !entry.tags.iter().any(|t| tags.contains(&t.as_str())));
        Ok(())
    }
}

/// Compute-once, publish-once cache of the detector's output.
///
/// Concurrent callers that miss the cache are serialized so that at most one
/// detection runs per invalidation epoch. A result computed while an
/// invalidation arrived is returned to its caller but never published.
pub struct ChangelistCache {
    backend: Arc<dyn CacheBackend>,
    compute_lock: Mutex<()>,
    epoch: Mutex<u64>,
    computations: AtomicU64,
}

impl ChangelistCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            compute_lock: Mutex::new(()),
            epoch: Mutex::new(0),
            computations: AtomicU64::new(0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheBackend::new()))
    }

    /// Return the cached changelist, computing and storing it on a miss.
    pub fn get_changelist(
        &self,
        detector: &ChangeDetector,
        source: &dyn ConfigStore,
        target: &dyn ConfigStore,
    ) -> EngineResult<Changelist> {
        if let Some(changes) = self.backend.get(CACHE_KEY)? {
            debug!(key = CACHE_KEY, "changelist cache hit");
            return Ok(changes);
        }

        let _guard = self
            .compute_lock
            .lock()
            .map_err(|e| EngineError::Cache(format!("lock poisoned: {e}")))?;
        // Another caller may have published while we waited.
        if let Some(changes) = self.backend.get(CACHE_KEY)? {
            return Ok(changes);
        }

        let started_at = self.current_epoch()?;
        debug!(key = CACHE_KEY, epoch = started_at, "changelist cache miss");
        let changes = detector.detect(source, target)?;
        self.computations.fetch_add(1, Ordering::Relaxed);

        let epoch = self
            .epoch
            .lock()
            .map_err(|e| EngineError::Cache(format!("lock poisoned: {e}")))?;
        if *epoch == started_at {
            self.backend.set(CACHE_KEY, changes.clone(), &[CACHE_TAG])?;
        } else {
            debug!(started_at, now = *epoch, "invalidated during detection, not caching");
        }
        Ok(changes)
    }

    /// Drop the cached changelist. Must be called whenever either store changes.
    pub fn invalidate(&self) -> EngineResult<()> {
        let mut epoch = self
            .epoch
            .lock()
            .map_err(|e| EngineError::Cache(format!("lock poisoned: {e}")))?;
        *epoch += 1;
        self.backend.invalidate_tags(&[CACHE_TAG])?;
        debug!(epoch = *epoch, tag = CACHE_TAG, "changelist cache invalidated");
        Ok(())
    }

    /// Number of detector runs performed through this cache.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    fn current_epoch(&self) -> EngineResult<u64> {
        self.epoch
            .lock()
            .map(|e| *e)
            .map_err(|e| EngineError::Cache(format!("lock poisoned: {e}")))
    }
}

impl StoreListener for ChangelistCache {
    fn on_store_event(&self, event: &StoreEvent) {
        if let Err(e) = self.invalidate() {
            warn!(namespace = %event.namespace(), error = %e, "failed to invalidate changelist cache");
        }
    }
}

impl std::fmt::Debug for ChangelistCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangelistCache")
            .field("computations", &self.computations())
            .finish()
    }
}
