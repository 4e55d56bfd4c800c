//! Error types for the gtv-crypto crate

use thiserror::Error;

/// Result type alias using `CryptoError`
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur while handling digests
#[derive(Error, Debug)]
pub enum CryptoError {
    /// A hash of the wrong length was supplied where a full digest was required
    #[error("invalid hash length: expected {expected} bytes, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },

    /// Unknown digest algorithm name
    #[error("unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Hex decode error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}
