//! Engine configuration

use gtv_crypto::DigestAlgorithm;
use serde::{Deserialize, Serialize};

/// Default maximum nesting depth accepted from untrusted input
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum nesting depth of a deserialized proof tree
pub const DEFAULT_MAX_PROOF_DEPTH: usize = 256;

/// Default maximum encoded size accepted from untrusted input (16 MiB)
pub const DEFAULT_MAX_BYTES: usize = 16 * 1024 * 1024;

/// Default number of memoized root hashes
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Top-level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GtvConfig {
    /// Limits applied to decoding, parsing and proof deserialization
    pub codec: CodecLimits,
    /// Hash calculator settings
    pub merkle: MerkleConfig,
}

/// Hardening limits for attacker-supplied input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecLimits {
    /// Maximum container nesting depth (the root is depth 0)
    pub max_depth: usize,
    /// Maximum encoded size in bytes
    pub max_bytes: usize,
    /// Maximum nesting depth of a proof, which adds a level per tree layer
    pub max_proof_depth: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_bytes: DEFAULT_MAX_BYTES,
            max_proof_depth: DEFAULT_MAX_PROOF_DEPTH,
        }
    }
}

impl CodecLimits {
    /// Limits that only guard against runaway recursion
    pub fn unbounded_size() -> Self {
        Self {
            max_bytes: usize::MAX,
            ..Self::default()
        }
    }

    /// The limits used while decoding a serialized proof
    pub fn for_proofs(&self) -> Self {
        Self {
            max_depth: self.max_proof_depth,
            ..*self
        }
    }
}

/// Hash calculator configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MerkleConfig {
    /// Digest the calculator runs on
    pub digest: DigestAlgorithm,
    /// Memoized root hashes kept; 0 disables memoization
    pub cache_capacity: usize,
}

impl Default for MerkleConfig {
    fn default() -> Self {
        Self {
            digest: DigestAlgorithm::Sha256,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GtvConfig::default();
        assert_eq!(config.codec.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.merkle.digest, DigestAlgorithm::Sha256);
        assert_eq!(config.merkle.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GtvConfig =
            serde_json::from_str(r#"{"merkle": {"digest": "blake3"}}"#).unwrap();
        assert_eq!(config.merkle.digest, DigestAlgorithm::Blake3);
        assert_eq!(config.merkle.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.codec, CodecLimits::default());
    }
}
