//! Hash calculators

use super::cache::MerkleHashCache;
use super::HASH_PREFIX_LEAF;
use crate::codec::encode;
use crate::config::MerkleConfig;
use crate::value::Gtv;
use gtv_crypto::{Digester, Hash, Sha256Digester};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Computes leaf and node hashes for the Merkle engine
pub trait MerkleHashCalculator {
    /// Hash of a primitive leaf
    fn calculate_leaf_hash(&self, value: &Gtv) -> Hash;

    /// Hash of an interior node; `prefix` tells plain nodes from container heads
    fn calculate_node_hash(&self, prefix: u8, left: &Hash, right: &Hash) -> Hash;

    /// Previously computed root of `value`, if memoized
    fn lookup_root(&self, _value: &Gtv) -> Option<Hash> {
        None
    }

    /// Remember the root of `value`
    fn store_root(&self, _value: &Gtv, _hash: &Hash) {}
}

/// The production calculator: leaves hash their canonical encoding
///
/// `leaf = H(0x01 || encode(value))`, `node = H(prefix || left || right)`.
#[derive(Clone)]
pub struct GtvMerkleHashCalculator {
    digester: Arc<dyn Digester>,
    cache: Option<MerkleHashCache>,
}

impl GtvMerkleHashCalculator {
    /// A calculator over `digester` without memoization
    pub fn new(digester: Arc<dyn Digester>) -> Self {
        Self {
            digester,
            cache: None,
        }
    }

    /// SHA-256 without memoization
    pub fn sha256() -> Self {
        Self::new(Arc::new(Sha256Digester))
    }

    /// Memoize up to `capacity` roots; 0 disables memoization
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(MerkleHashCache::new);
        self
    }

    pub fn from_config(config: &MerkleConfig) -> Self {
        Self::new(config.digest.digester()).with_cache(config.cache_capacity)
    }

    pub fn cache(&self) -> Option<&MerkleHashCache> {
        self.cache.as_ref()
    }

    pub fn digester_name(&self) -> &'static str {
        self.digester.name()
    }
}

impl Default for GtvMerkleHashCalculator {
    fn default() -> Self {
        Self::sha256()
    }
}

impl std::fmt::Debug for GtvMerkleHashCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GtvMerkleHashCalculator")
            .field("digester", &self.digester.name())
            .field("cache", &self.cache)
            .finish()
    }
}

impl MerkleHashCalculator for GtvMerkleHashCalculator {
    fn calculate_leaf_hash(&self, value: &Gtv) -> Hash {
        self.digester
            .digest_parts(&[&[HASH_PREFIX_LEAF], &encode(value)])
    }

    fn calculate_node_hash(&self, prefix: u8, left: &Hash, right: &Hash) -> Hash {
        self.digester
            .digest_parts(&[&[prefix], left.as_bytes(), right.as_bytes()])
    }

    fn lookup_root(&self, value: &Gtv) -> Option<Hash> {
        self.cache.as_ref()?.get(value)
    }

    fn store_root(&self, value: &Gtv, hash: &Hash) {
        if let Some(cache) = &self.cache {
            cache.insert(value.clone(), hash.clone());
        }
    }
}
