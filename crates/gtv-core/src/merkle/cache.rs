//! Memo table for root hashes
//!
//! Values carry no hash slot of their own; a calculator may instead keep a
//! bounded table from value to root hash. Clones of a cache share the table.

use crate::value::Gtv;
use gtv_crypto::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hit and miss counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU-bounded map from value to Merkle root
#[derive(Clone)]
pub struct MerkleHashCache {
    entries: Arc<parking_lot::Mutex<lru::LruCache<Gtv, Hash>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl MerkleHashCache {
    /// Create a cache holding at most `capacity` roots
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Arc::new(parking_lot::Mutex::new(lru::LruCache::new(capacity))),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn get(&self, value: &Gtv) -> Option<Hash> {
        let found = self.entries.lock().get(value).cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn insert(&self, value: Gtv, hash: Hash) {
        self.entries.lock().put(value, hash);
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.entries.lock().clear();
    }

    /// Number of memoized roots
    pub fn cache_len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for MerkleHashCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerkleHashCache")
            .field("len", &self.cache_len())
            .field("stats", &self.stats())
            .finish()
    }
}
