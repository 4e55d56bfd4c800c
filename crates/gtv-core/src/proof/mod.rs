//! Selective-disclosure proofs
//!
//! A proof discloses some sub-values of a value and replaces every other
//! subtree of its binary tree with that subtree's hash. Anyone holding the
//! value's root hash can check the disclosed parts without the rest.
//!
//! - `builder`: prune a value's tree down to a path set
//! - `tree`: the proof tree and its hashing
//! - `serialize`: the wire form
//! - `verify`: root comparison

mod builder;
mod serialize;
mod tree;
mod verify;

pub use builder::{build_proof, build_proof_from_tree};
pub use serialize::{
    NO_PATH_ELEMENT, TAG_ARRAY_HEAD, TAG_DICT_HEAD, TAG_HASHED_LEAF, TAG_NODE, TAG_VALUE_LEAF,
};
pub use tree::{GtvMerkleProofTree, ProofElement};
pub use verify::{verify, verify_serialized, verify_with_paths};
