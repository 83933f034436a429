//! Caching of resolved configuration documents
//!
//! The manager caches the whole merged document for a location and slices
//! subsections out of it on every read, so requests for different sections of
//! one file share a single load.

use lru::LruCache;
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::SystemTime;

/// A cached, fully merged configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct CachedConfig {
    pub value: Value,
    /// Modification time of the location's own file when it was loaded
    pub modified: Option<SystemTime>,
}

impl CachedConfig {
    pub fn new(value: Value, modified: Option<SystemTime>) -> Self {
        Self { value, modified }
    }
}

/// Storage for resolved documents, keyed by location cache key
pub trait ConfigCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<CachedConfig>>;

    fn set(&self, key: String, entry: Arc<CachedConfig>);

    /// Drop a single entry
    fn invalidate(&self, key: &str);

    fn clear(&self);
}

/// Unbounded in-memory cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Arc<CachedConfig>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<CachedConfig>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: String, entry: Arc<CachedConfig>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    fn invalidate(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Bounded cache evicting the least recently used document
pub struct LruConfigCache {
    entries: Mutex<LruCache<String, Arc<CachedConfig>>>,
}

impl LruConfigCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LruConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("LruConfigCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

impl ConfigCache for LruConfigCache {
    fn get(&self, key: &str) -> Option<Arc<CachedConfig>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: String, entry: Arc<CachedConfig>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, entry);
    }

    fn invalidate(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop(key);
    }

    fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
