//! Merkle hashing of values
//!
//! - `tree`: balanced binary trees over a value's leaves
//! - `calculator`: the leaf/node hash functions
//! - `cache`: optional memoization of root hashes
//!
//! The root of a primitive is its leaf hash. The root of a container is its
//! head node hash, which commits to the container's type through the head
//! prefix and to every element through the tree below it.

mod cache;
mod calculator;
mod tree;

pub use cache::{CacheStats, MerkleHashCache};
pub use calculator::{GtvMerkleHashCalculator, MerkleHashCalculator};
pub use tree::{BinaryTree, ContainerHead, PathMarker, TreeElement};

use crate::value::Gtv;
use gtv_crypto::{Hash, HASH_BYTE_SIZE};
use tracing::trace;

/// Prefix of plain interior nodes
pub const HASH_PREFIX_NODE: u8 = 0;
/// Prefix of leaves
pub const HASH_PREFIX_LEAF: u8 = 1;
/// Prefix of array head nodes
pub const HASH_PREFIX_NODE_ARRAY: u8 = 7;
/// Prefix of dictionary head nodes
pub const HASH_PREFIX_NODE_DICT: u8 = 8;

/// The sentinel standing in for absent children
pub fn empty_hash() -> Hash {
    Hash::new(vec![0u8; HASH_BYTE_SIZE])
}

/// Merkle root of `value`
///
/// Containers are looked up in and stored to the calculator's memo table, if
/// it keeps one.
pub fn merkle_hash<C: MerkleHashCalculator + ?Sized>(value: &Gtv, calc: &C) -> Hash {
    if !value.is_container() {
        return calc.calculate_leaf_hash(value);
    }
    if let Some(hash) = calc.lookup_root(value) {
        trace!("root hash memo hit");
        return hash;
    }
    let hash = BinaryTree::build(value).root_hash(calc);
    calc.store_root(value, &hash);
    hash
}

impl Gtv {
    /// Merkle root of this value
    pub fn merkle_hash<C: MerkleHashCalculator + ?Sized>(&self, calc: &C) -> Hash {
        merkle_hash(self, calc)
    }
}
