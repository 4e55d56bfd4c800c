//! Digest utilities for Merkle hashing
//!
//! This module provides the digest function the Merkle engine is built on:
//! - `Hash`, an owned digest with hex conversions
//! - the `Digester` trait, so the engine can run on any fixed-length digest
//! - SHA-256 (the default for chain identifiers) and BLAKE3 implementations

use crate::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Size of a full digest in bytes (256 bits)
pub const HASH_BYTE_SIZE: usize = 32;

/// Type alias for full digest bytes
pub type HashOutput = [u8; HASH_BYTE_SIZE];

/// An owned digest value.
///
/// Real digesters always produce `HASH_BYTE_SIZE` bytes. The length is not
/// fixed in the type so that test calculators with toy digests can share the
/// same Merkle code paths.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hash(#[serde(with = "hex_serde")] Vec<u8>);

impl Hash {
    /// Create a hash from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Create a hash from a hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(hex::decode(s)?))
    }

    /// Get the hash as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the hash, returning the bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Convert to a lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Number of bytes in the digest
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the digest has no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Convert into a fixed-size digest, failing for toy or truncated hashes
    pub fn to_output(&self) -> Result<HashOutput> {
        self.0
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidHashLength {
                expected: HASH_BYTE_SIZE,
                actual: self.0.len(),
            })
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<HashOutput> for Hash {
    fn from(bytes: HashOutput) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Hash {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<blake3::Hash> for Hash {
    fn from(hash: blake3::Hash) -> Self {
        Self(hash.as_bytes().to_vec())
    }
}

/// A digest function over byte sequences.
///
/// Implementations must be deterministic and thread safe; the Merkle engine
/// calls them concurrently from independent callers.
pub trait Digester: Send + Sync {
    /// Digest the concatenation of `parts` without materializing it
    fn digest_parts(&self, parts: &[&[u8]]) -> Hash;

    /// Digest a single byte slice
    fn digest(&self, data: &[u8]) -> Hash {
        self.digest_parts(&[data])
    }

    /// Algorithm name, for logs
    fn name(&self) -> &'static str;
}

/// SHA-256 digester
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn digest_parts(&self, parts: &[&[u8]]) -> Hash {
        let mut hasher = sha2::Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        let out: HashOutput = hasher.finalize().into();
        out.into()
    }

    fn name(&self) -> &'static str {
        "sha256"
    }
}

/// BLAKE3 digester
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Digester;

impl Digester for Blake3Digester {
    fn digest_parts(&self, parts: &[&[u8]]) -> Hash {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }

    fn name(&self) -> &'static str {
        "blake3"
    }
}

/// Selectable digest algorithm, used by configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    /// Build the digester for this algorithm
    pub fn digester(&self) -> Arc<dyn Digester> {
        match self {
            Self::Sha256 => Arc::new(Sha256Digester),
            Self::Blake3 => Arc::new(Blake3Digester),
        }
    }

    /// Algorithm name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(CryptoError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod hex_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_sha256_known_vector() {
        let hash = Sha256Digester.digest(b"abc");
        assert_eq!(
            hash.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_blake3_matches_reference() {
        let data = b"Hello, World!";
        assert_eq!(Blake3Digester.digest(data), Hash::from(blake3::hash(data)));
    }

    #[rstest]
    #[case(DigestAlgorithm::Sha256)]
    #[case(DigestAlgorithm::Blake3)]
    fn test_parts_equal_concatenation(#[case] algorithm: DigestAlgorithm) {
        let digester = algorithm.digester();
        let whole = digester.digest(b"\x07leftright");
        let parts = digester.digest_parts(&[b"\x07", b"left", b"right"]);
        assert_eq!(whole, parts);
        assert_eq!(whole.len(), HASH_BYTE_SIZE);
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash = Sha256Digester.digest(b"test");
        let parsed = Hash::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, parsed);
        assert!(parsed.to_output().is_ok());
    }

    #[test]
    fn test_short_hash_is_not_an_output() {
        let hash = Hash::new(vec![1, 2, 3]);
        assert!(matches!(
            hash.to_output(),
            Err(CryptoError::InvalidHashLength { expected: 32, actual: 3 })
        ));
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("SHA256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("blake3".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Blake3);
        assert!("md5".parse::<DigestAlgorithm>().is_err());
    }

    #[test]
    fn test_hash_serde_as_hex() {
        let hash = Hash::new(vec![0xAB, 0x01]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"ab01\"");
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
