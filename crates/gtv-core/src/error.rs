//! Error types for the gtv-core crate

use crate::value::GtvType;
use thiserror::Error;

/// Result type alias using `GtvError`
pub type Result<T> = std::result::Result<T, GtvError>;

/// Errors that can occur while encoding, hashing or proving values
#[derive(Error, Debug)]
pub enum GtvError {
    /// Corrupt, truncated or over-long binary encoding
    #[error("malformed encoding at byte {offset}: {reason}")]
    MalformedEncoding { offset: usize, reason: String },

    /// Type-specific accessor used on a value of another type
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: GtvType, actual: GtvType },

    /// Structurally invalid proof
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// Path that does not resolve in the target value
    #[error("invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Nesting or size beyond the configured hardening limits
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Text syntax error
    #[error("parse error at position {position}: {reason}")]
    Parse { position: usize, reason: String },

    /// Incompatible values during a builder merge
    #[error("merge conflict at [{path}]: {reason}")]
    MergeConflict { path: String, reason: String },

    /// IO error while streaming values
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GtvError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedEncoding {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn type_mismatch(expected: GtvType, actual: GtvType) -> Self {
        Self::TypeMismatch { expected, actual }
    }
}
