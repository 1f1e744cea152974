//! In-process LRU tier of the template cache.

use std::num::NonZeroUsize;

use lru::LruCache;

use super::key::TemplateKey;
use super::payload::ImagePayload;

/// Default number of decoded images kept in memory.
pub const DEFAULT_MEMORY_CAPACITY: usize = 50;

/// Fixed-capacity least-recently-used map from key to image.
///
/// Not synchronized; [`TemplateCache`](super::TemplateCache) keeps it behind a
/// mutex so that every `get`/`put` updates recency under one lock.
pub struct MemoryCache {
    entries: LruCache<TemplateKey, ImagePayload>,
}

impl MemoryCache {
    /// Create a cache holding at most `capacity` images.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Look up an image, marking it most recently used on a hit.
    pub fn get(&mut self, key: &TemplateKey) -> Option<ImagePayload> {
        self.entries.get(key).cloned()
    }

    /// Insert or replace an image; evicts the least recently used entry when
    /// a new key arrives at capacity.
    pub fn put(&mut self, key: TemplateKey, payload: ImagePayload) {
        // `push` also hands back the old pair when the key was already present.
        if let Some((evicted, _)) = self.entries.push(key.clone(), payload) {
            if evicted != key {
                tracing::debug!("Evicted {} from memory cache", evicted);
            }
        }
    }

    /// Check for a key without touching its recency.
    pub fn contains(&self, key: &TemplateKey) -> bool {
        self.entries.contains(key)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<TemplateKey> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_MEMORY_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}
