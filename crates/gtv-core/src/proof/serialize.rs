//! Wire form of proof trees
//!
//! A proof is written as a value and then encoded with the canonical codec.
//! Each element becomes an array whose first item is an integer tag:
//!
//! | Element     | Array                                       |
//! |-------------|---------------------------------------------|
//! | hashed leaf | `[100, hash]`                               |
//! | value leaf  | `[101, path_element, value]`                |
//! | node        | `[102, left, right]`                        |
//! | array head  | `[103, size, path_element, left, right]`    |
//! | dict head   | `[104, size, path_element, left, right]`    |
//!
//! A path element is an integer index or a string key; `-10` marks its
//! absence.

use super::tree::{GtvMerkleProofTree, ProofElement};
use crate::codec::{decode_with_limits, encode};
use crate::config::CodecLimits;
use crate::error::{GtvError, Result};
use crate::path::PathElement;
use crate::value::Gtv;
use gtv_crypto::Hash;

pub const TAG_HASHED_LEAF: i64 = 100;
pub const TAG_VALUE_LEAF: i64 = 101;
pub const TAG_NODE: i64 = 102;
pub const TAG_ARRAY_HEAD: i64 = 103;
pub const TAG_DICT_HEAD: i64 = 104;

/// Written in place of a missing path element
pub const NO_PATH_ELEMENT: i64 = -10;

impl GtvMerkleProofTree {
    /// The proof as a value
    pub fn to_gtv(&self) -> Gtv {
        element_to_gtv(self.root())
    }

    /// Rebuild a proof from its value form
    pub fn from_gtv(value: &Gtv) -> Result<Self> {
        Ok(Self::new(element_from_gtv(value)?))
    }

    /// Canonical encoding of the proof
    pub fn serialize(&self) -> Vec<u8> {
        encode(&self.to_gtv())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize()
    }

    /// Decode a proof with the default limits
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Self::deserialize_with_limits(bytes, &CodecLimits::default())
    }

    /// Decode a proof, applying the proof depth limit to its nesting
    pub fn deserialize_with_limits(bytes: &[u8], limits: &CodecLimits) -> Result<Self> {
        let value = decode_with_limits(bytes, &limits.for_proofs())?;
        Self::from_gtv(&value)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::deserialize(bytes)
    }
}

fn element_to_gtv(element: &ProofElement) -> Gtv {
    match element {
        ProofElement::HashedLeaf(hash) => Gtv::Array(vec![
            Gtv::Integer(TAG_HASHED_LEAF),
            Gtv::ByteArray(hash.as_bytes().to_vec()),
        ]),
        ProofElement::ValueLeaf {
            value,
            path_element,
        } => Gtv::Array(vec![
            Gtv::Integer(TAG_VALUE_LEAF),
            path_element_to_gtv(path_element.as_ref()),
            value.clone(),
        ]),
        ProofElement::Node { left, right } => Gtv::Array(vec![
            Gtv::Integer(TAG_NODE),
            element_to_gtv(left),
            element_to_gtv(right),
        ]),
        ProofElement::ArrayHead {
            size,
            path_element,
            left,
            right,
        } => head_to_gtv(TAG_ARRAY_HEAD, *size, path_element.as_ref(), left, right),
        ProofElement::DictHead {
            size,
            path_element,
            left,
            right,
        } => head_to_gtv(TAG_DICT_HEAD, *size, path_element.as_ref(), left, right),
    }
}

fn head_to_gtv(
    tag: i64,
    size: usize,
    path_element: Option<&PathElement>,
    left: &ProofElement,
    right: &ProofElement,
) -> Gtv {
    Gtv::Array(vec![
        Gtv::Integer(tag),
        Gtv::Integer(size as i64),
        path_element_to_gtv(path_element),
        element_to_gtv(left),
        element_to_gtv(right),
    ])
}

fn path_element_to_gtv(element: Option<&PathElement>) -> Gtv {
    match element {
        None => Gtv::Integer(NO_PATH_ELEMENT),
        Some(PathElement::ArrayIndex(i)) => Gtv::Integer(*i as i64),
        Some(PathElement::DictKey(key)) => Gtv::String(key.clone()),
    }
}

fn malformed(reason: impl Into<String>) -> GtvError {
    GtvError::MalformedProof(reason.into())
}

fn element_from_gtv(value: &Gtv) -> Result<ProofElement> {
    let Gtv::Array(items) = value else {
        return Err(malformed(format!(
            "expected an array element, got {}",
            value.gtv_type()
        )));
    };
    let tag = match items.first() {
        Some(Gtv::Integer(tag)) => *tag,
        Some(other) => return Err(malformed(format!("tag must be an integer, got {}", other.gtv_type()))),
        None => return Err(malformed("empty element")),
    };
    let fields = &items[1..];

    match tag {
        TAG_HASHED_LEAF => {
            let [hash] = expect_fields(tag, fields)?;
            let Gtv::ByteArray(bytes) = hash else {
                return Err(malformed("hashed leaf must hold a byte array"));
            };
            Ok(ProofElement::HashedLeaf(Hash::new(bytes.clone())))
        }
        TAG_VALUE_LEAF => {
            let [path_element, value] = expect_fields(tag, fields)?;
            Ok(ProofElement::ValueLeaf {
                value: value.clone(),
                path_element: path_element_from_gtv(path_element)?,
            })
        }
        TAG_NODE => {
            let [left, right] = expect_fields(tag, fields)?;
            Ok(ProofElement::Node {
                left: Box::new(element_from_gtv(left)?),
                right: Box::new(element_from_gtv(right)?),
            })
        }
        TAG_ARRAY_HEAD | TAG_DICT_HEAD => {
            let [size, path_element, left, right] = expect_fields(tag, fields)?;
            let size = match size {
                Gtv::Integer(n) => usize::try_from(*n)
                    .map_err(|_| malformed(format!("negative container size {n}")))?,
                other => return Err(malformed(format!("size must be an integer, got {}", other.gtv_type()))),
            };
            let path_element = path_element_from_gtv(path_element)?;
            let left = Box::new(element_from_gtv(left)?);
            let right = Box::new(element_from_gtv(right)?);
            Ok(if tag == TAG_ARRAY_HEAD {
                ProofElement::ArrayHead {
                    size,
                    path_element,
                    left,
                    right,
                }
            } else {
                ProofElement::DictHead {
                    size,
                    path_element,
                    left,
                    right,
                }
            })
        }
        other => Err(malformed(format!("unknown element tag {other}"))),
    }
}

fn expect_fields<const N: usize>(tag: i64, fields: &[Gtv]) -> Result<&[Gtv; N]> {
    fields.try_into().map_err(|_| {
        malformed(format!(
            "element with tag {tag} needs {N} fields, got {}",
            fields.len()
        ))
    })
}

fn path_element_from_gtv(value: &Gtv) -> Result<Option<PathElement>> {
    match value {
        Gtv::Integer(NO_PATH_ELEMENT) => Ok(None),
        Gtv::Integer(i) => usize::try_from(*i)
            .map(|i| Some(PathElement::ArrayIndex(i)))
            .map_err(|_| malformed(format!("invalid path element {i}"))),
        Gtv::String(key) => Ok(Some(PathElement::DictKey(key.clone()))),
        other => Err(malformed(format!(
            "path element must be an integer or string, got {}",
            other.gtv_type()
        ))),
    }
}
