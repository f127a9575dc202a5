use std::num::NonZeroUsize;

use forest_schema::ProofArtifact;
use lru::LruCache;
use parking_lot::Mutex;

use crate::witness::MoveCacheKey;

pub const DEFAULT_MOVE_CACHE_CAPACITY: usize = 20;

/// Bounded LRU of finished move proofs.
#[derive(Debug)]
pub struct MoveProofCache {
    entries: Mutex<LruCache<MoveCacheKey, ProofArtifact>>,
}

impl MoveProofCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Looks up and marks the entry most recently used.
    pub fn get(&self, key: &MoveCacheKey) -> Option<ProofArtifact> {
        self.entries.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &MoveCacheKey) -> bool {
        self.entries.lock().contains(key)
    }

    /// Inserts, returning the evicted least-recently-used key if the cache was full.
    pub fn insert(&self, key: MoveCacheKey, artifact: ProofArtifact) -> Option<MoveCacheKey> {
        self.entries
            .lock()
            .push(key, artifact)
            .and_then(|(evicted, _)| (evicted != key).then_some(evicted))
    }

    /// Keeps the most recently used entries up to the new capacity.
    pub fn resize(&self, capacity: NonZeroUsize) {
        self.entries.lock().resize(capacity);
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for MoveProofCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_MOVE_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}
