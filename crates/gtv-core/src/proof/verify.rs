//! Proof verification

use super::tree::GtvMerkleProofTree;
use crate::config::CodecLimits;
use crate::error::Result;
use crate::merkle::MerkleHashCalculator;
use gtv_crypto::Hash;
use tracing::debug;

/// Check that `proof` hashes to `expected_root`
///
/// A mismatch is a normal `false`, not an error.
pub fn verify<C: MerkleHashCalculator + ?Sized>(
    proof: &GtvMerkleProofTree,
    expected_root: &Hash,
    calc: &C,
) -> bool {
    let actual = proof.merkle_hash(calc);
    if actual == *expected_root {
        true
    } else {
        debug!(expected = %expected_root.to_hex(), actual = %actual.to_hex(), "proof root mismatch");
        false
    }
}

/// Decode a serialized proof and verify it
///
/// Fails only when the bytes are not a well-formed proof.
pub fn verify_serialized<C: MerkleHashCalculator + ?Sized>(
    bytes: &[u8],
    expected_root: &Hash,
    limits: &CodecLimits,
    calc: &C,
) -> Result<bool> {
    let proof = GtvMerkleProofTree::deserialize_with_limits(bytes, limits)?;
    Ok(verify(&proof, expected_root, calc))
}

/// Verify the root and that every recorded path element matches its position
///
/// Use this before trusting the paths reported by
/// [`GtvMerkleProofTree::disclosed_values`]. A root mismatch is `Ok(false)`;
/// a path element that contradicts the tree shape is a malformed-proof error.
pub fn verify_with_paths<C: MerkleHashCalculator + ?Sized>(
    proof: &GtvMerkleProofTree,
    expected_root: &Hash,
    calc: &C,
) -> Result<bool> {
    if !verify(proof, expected_root, calc) {
        return Ok(false);
    }
    proof.check_paths(calc)?;
    Ok(true)
}

impl GtvMerkleProofTree {
    pub fn verify<C: MerkleHashCalculator + ?Sized>(&self, expected_root: &Hash, calc: &C) -> bool {
        verify(self, expected_root, calc)
    }
}
