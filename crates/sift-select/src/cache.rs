//! Selector-string cache.
//!
//! An explicitly owned LRU keyed by the literal input string. Only complete
//! [`SelectorList`]s are ever inserted; failed parses leave no trace.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::debug;

use crate::selector::SelectorList;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Shared, thread-safe cache of parsed selector lists.
#[derive(Debug)]
pub struct SelectorCache {
    entries: Mutex<LruCache<String, Arc<SelectorList>>>,
}

impl SelectorCache {
    /// Cache holding at most `capacity` selector strings.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cache that never evicts.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<SelectorList>>> {
        // A panic while holding the lock cannot leave a partial entry behind:
        // values are inserted whole.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached list for `key`, refreshing its recency.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<SelectorList>> {
        self.lock().get(key).cloned()
    }

    /// Return the cached list for `key`, or build, insert and return it.
    ///
    /// `build` runs without the lock held. When two callers build the same key
    /// concurrently, the first insertion wins and both receive that `Arc`.
    ///
    /// # Errors
    ///
    /// Whatever `build` returns; nothing is inserted in that case.
    pub fn get_or_try_insert<E>(
        &self,
        key: &str,
        build: impl FnOnce() -> Result<SelectorList, E>,
    ) -> Result<Arc<SelectorList>, E> {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        debug!(selector = key, "selector cache miss");
        let built = Arc::new(build()?);

        let mut entries = self.lock();
        if let Some(raced) = entries.get(key) {
            return Ok(Arc::clone(raced));
        }
        let _ = entries.put(key.to_owned(), Arc::clone(&built));
        Ok(built)
    }

    /// Number of cached strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.lock().cap()
    }
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
