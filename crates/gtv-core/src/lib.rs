//! # GTV Core
//!
//! Generic Transfer Value: a small self-describing value model with a
//! canonical binary encoding, Merkle hashing and selective-disclosure proofs.
//!
//! This crate provides:
//! - **Values**: null, integers, big integers, strings, byte arrays, arrays
//!   and key-sorted dictionaries
//! - **Codec**: deterministic DER-style encoding, buffered and streaming
//! - **Merkle hashing**: balanced binary trees with prefix-separated leaves
//!   and nodes, over a pluggable digest
//! - **Proofs**: disclose chosen paths of a value, prove them against the
//!   value's root hash
//! - **Text syntax** and a **merge builder** for configuration documents
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │   text syntax   │   merge builder            │
//! ├──────────────────────────────────────────────┤
//! │                  Gtv value                   │
//! ├───────────────┬──────────────────────────────┤
//! │     codec     │  binary tree → Merkle root   │
//! │               │  path set → proof → verify   │
//! ├───────────────┴──────────────────────────────┤
//! │                 gtv-crypto                   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gtv_core::{verify, Gtv, GtvMerkleHashCalculator, GtvPathSet};
//!
//! let block: Gtv = r#"{"height": 7, "txs": ["a", "b", "c"]}"#.parse().unwrap();
//! let calc = GtvMerkleHashCalculator::sha256();
//! let root = block.merkle_hash(&calc);
//!
//! let paths: GtvPathSet = "/txs/1".parse().unwrap();
//! let proof = block.generate_proof(&paths, &calc).unwrap();
//! assert!(verify(&proof, &root, &calc));
//! ```

pub mod builder;
pub mod codec;
pub mod config;
pub mod error;
pub mod merkle;
pub mod path;
pub mod proof;
pub mod testing;
pub mod text;
pub mod value;

pub use builder::{ArrayMerge, DictMerge, GtvBuilder};
pub use codec::{decode, decode_with_limits, encode, GtvStreamReader, GtvStreamWriter};
pub use config::{CodecLimits, GtvConfig, MerkleConfig};
pub use error::{GtvError, Result};
pub use merkle::{merkle_hash, GtvMerkleHashCalculator, MerkleHashCalculator};
pub use path::{GtvPath, GtvPathSet, PathElement};
pub use proof::{build_proof, verify, verify_serialized, verify_with_paths, GtvMerkleProofTree, ProofElement};
pub use text::parse;
pub use value::{Gtv, GtvType};

pub use gtv_crypto::Hash;
