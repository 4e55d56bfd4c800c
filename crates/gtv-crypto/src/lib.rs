//! # GTV Crypto
//!
//! Digest primitives consumed by the GTV Merkle hashing engine.
//!
//! The Merkle engine is agnostic to the digest it runs on, as long as the
//! output has a fixed length and is collision resistant. This crate provides:
//! - **`Hash`**: an owned digest value with hex conversions
//! - **`Digester`**: the pluggable digest trait
//! - **SHA-256 and BLAKE3** implementations, selectable via `DigestAlgorithm`
//!
//! ## Example
//!
//! ```rust
//! use gtv_crypto::{Digester, Sha256Digester};
//!
//! let digest = Sha256Digester.digest(b"block header");
//! assert_eq!(digest.len(), gtv_crypto::HASH_BYTE_SIZE);
//! ```

pub mod error;
pub mod hashing;

pub use error::{CryptoError, Result};
pub use hashing::{
    Blake3Digester, DigestAlgorithm, Digester, Hash, HashOutput, Sha256Digester, HASH_BYTE_SIZE,
};
