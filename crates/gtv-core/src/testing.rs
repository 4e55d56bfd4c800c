//! Deterministic calculators for hand-checkable test vectors

use crate::codec::{big_signed_bytes, encode, minimal_signed_bytes};
use crate::merkle::{MerkleHashCalculator, HASH_PREFIX_LEAF};
use crate::value::Gtv;
use gtv_crypto::Hash;

/// A calculator whose "digest" adds one to every byte
///
/// Leaves serialize primitives directly instead of encoding them: byte arrays
/// as-is, strings as UTF-8, integers as minimal two's complement and null as a
/// single zero byte. Hash trees built with it can be read off by hand.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyMerkleHashCalculator;

impl DummyMerkleHashCalculator {
    fn digest(parts: &[&[u8]]) -> Hash {
        Hash::new(
            parts
                .iter()
                .flat_map(|part| part.iter())
                .map(|b| b.wrapping_add(1))
                .collect::<Vec<u8>>(),
        )
    }

    fn serialize(value: &Gtv) -> Vec<u8> {
        match value {
            Gtv::Null => vec![0],
            Gtv::Integer(i) => minimal_signed_bytes(*i),
            Gtv::BigInteger(b) => big_signed_bytes(b),
            Gtv::String(s) => s.as_bytes().to_vec(),
            Gtv::ByteArray(b) => b.clone(),
            Gtv::Array(_) | Gtv::Dict(_) => encode(value),
        }
    }
}

impl MerkleHashCalculator for DummyMerkleHashCalculator {
    fn calculate_leaf_hash(&self, value: &Gtv) -> Hash {
        Self::digest(&[&[HASH_PREFIX_LEAF], &Self::serialize(value)])
    }

    fn calculate_node_hash(&self, prefix: u8, left: &Hash, right: &Hash) -> Hash {
        Self::digest(&[&[prefix], left.as_bytes(), right.as_bytes()])
    }
}
