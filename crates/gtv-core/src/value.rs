//! The GTV value model
//!
//! A closed set of seven variants. Dictionaries are stored in a `BTreeMap`, so
//! iteration is always in ascending key order no matter how the value was
//! built; encoding and hashing depend on that.

use crate::error::{GtvError, Result};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;
use std::fmt;

/// Discriminant of a [`Gtv`] value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GtvType {
    Null,
    Integer,
    BigInteger,
    String,
    ByteArray,
    Array,
    Dict,
}

impl GtvType {
    /// Upper-case type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer => "INTEGER",
            Self::BigInteger => "BIGINTEGER",
            Self::String => "STRING",
            Self::ByteArray => "BYTEARRAY",
            Self::Array => "ARRAY",
            Self::Dict => "DICT",
        }
    }
}

impl fmt::Display for GtvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Generic Transfer Value
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gtv {
    Null,
    Integer(i64),
    BigInteger(BigInt),
    String(String),
    ByteArray(Vec<u8>),
    Array(Vec<Gtv>),
    Dict(BTreeMap<String, Gtv>),
}

impl Gtv {
    /// Build an array from anything convertible to values
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Gtv>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Build a dictionary; a repeated key keeps the last value
    pub fn dict<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Gtv>,
    {
        Self::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a byte array
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::ByteArray(bytes.into())
    }

    /// Build an empty dictionary
    pub fn empty_dict() -> Self {
        Self::Dict(BTreeMap::new())
    }

    pub fn gtv_type(&self) -> GtvType {
        match self {
            Self::Null => GtvType::Null,
            Self::Integer(_) => GtvType::Integer,
            Self::BigInteger(_) => GtvType::BigInteger,
            Self::String(_) => GtvType::String,
            Self::ByteArray(_) => GtvType::ByteArray,
            Self::Array(_) => GtvType::Array,
            Self::Dict(_) => GtvType::Dict,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Arrays and dictionaries become head nodes when hashed
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Dict(_))
    }

    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Self::Integer(i) => Ok(*i),
            Self::BigInteger(b) => b
                .to_i64()
                .ok_or_else(|| GtvError::type_mismatch(GtvType::Integer, GtvType::BigInteger)),
            other => Err(GtvError::type_mismatch(GtvType::Integer, other.gtv_type())),
        }
    }

    /// Integers widen to big integers
    pub fn as_big_integer(&self) -> Result<BigInt> {
        match self {
            Self::BigInteger(b) => Ok(b.clone()),
            Self::Integer(i) => Ok(BigInt::from(*i)),
            other => Err(GtvError::type_mismatch(GtvType::BigInteger, other.gtv_type())),
        }
    }

    /// Booleans travel as the integers 0 and 1
    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            Self::Integer(0) => Ok(false),
            Self::Integer(1) => Ok(true),
            other => Err(GtvError::type_mismatch(GtvType::Integer, other.gtv_type())),
        }
    }

    pub fn as_string(&self) -> Result<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(GtvError::type_mismatch(GtvType::String, other.gtv_type())),
        }
    }

    pub fn as_byte_array(&self) -> Result<&[u8]> {
        match self {
            Self::ByteArray(b) => Ok(b),
            other => Err(GtvError::type_mismatch(GtvType::ByteArray, other.gtv_type())),
        }
    }

    pub fn as_array(&self) -> Result<&[Gtv]> {
        match self {
            Self::Array(a) => Ok(a),
            other => Err(GtvError::type_mismatch(GtvType::Array, other.gtv_type())),
        }
    }

    pub fn as_dict(&self) -> Result<&BTreeMap<String, Gtv>> {
        match self {
            Self::Dict(d) => Ok(d),
            other => Err(GtvError::type_mismatch(GtvType::Dict, other.gtv_type())),
        }
    }

    /// Dictionary lookup; `None` for absent keys and for non-dictionaries
    pub fn get(&self, key: &str) -> Option<&Gtv> {
        match self {
            Self::Dict(d) => d.get(key),
            _ => None,
        }
    }

    /// Array lookup; `None` when out of range or not an array
    pub fn get_index(&self, index: usize) -> Option<&Gtv> {
        match self {
            Self::Array(a) => a.get(index),
            _ => None,
        }
    }

    /// Number of direct children (0 for primitives)
    pub fn len(&self) -> usize {
        match self {
            Self::Array(a) => a.len(),
            Self::Dict(d) => d.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<i64> for Gtv {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Gtv {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<bool> for Gtv {
    fn from(v: bool) -> Self {
        Self::Integer(v.into())
    }
}

impl From<BigInt> for Gtv {
    fn from(v: BigInt) -> Self {
        Self::BigInteger(v)
    }
}

impl From<&str> for Gtv {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Gtv {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Gtv {
    fn from(v: Vec<u8>) -> Self {
        Self::ByteArray(v)
    }
}

impl From<&[u8]> for Gtv {
    fn from(v: &[u8]) -> Self {
        Self::ByteArray(v.to_vec())
    }
}

impl From<Vec<Gtv>> for Gtv {
    fn from(v: Vec<Gtv>) -> Self {
        Self::Array(v)
    }
}

impl From<BTreeMap<String, Gtv>> for Gtv {
    fn from(v: BTreeMap<String, Gtv>) -> Self {
        Self::Dict(v)
    }
}

impl<T: Into<Gtv>> From<Option<T>> for Gtv {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_iterates_in_key_order() {
        let dict = Gtv::dict([
            ("x", Gtv::Null),
            ("ccc", Gtv::Null),
            ("1", Gtv::Null),
            ("b", Gtv::Null),
            ("a", Gtv::Null),
        ]);
        let keys: Vec<&str> = dict.as_dict().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["1", "a", "b", "ccc", "x"]);
    }

    #[test]
    fn test_insertion_order_is_irrelevant() {
        let a = Gtv::dict([("a", 1), ("b", 2)]);
        let b = Gtv::dict([("b", 2), ("a", 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_accessor_type_mismatch() {
        let value = Gtv::from("hello");
        let err = value.as_array().unwrap_err();
        assert!(matches!(
            err,
            GtvError::TypeMismatch { expected: GtvType::Array, actual: GtvType::String }
        ));
        assert_eq!(value.as_string().unwrap(), "hello");
    }

    #[test]
    fn test_integer_widens_but_big_does_not_always_narrow() {
        assert_eq!(Gtv::Integer(7).as_big_integer().unwrap(), BigInt::from(7));
        assert_eq!(Gtv::BigInteger(BigInt::from(7)).as_integer().unwrap(), 7);

        let huge = BigInt::from(i64::MAX) * 4;
        assert!(Gtv::BigInteger(huge).as_integer().is_err());
    }

    #[test]
    fn test_booleans() {
        assert!(Gtv::from(true).as_boolean().unwrap());
        assert!(!Gtv::from(false).as_boolean().unwrap());
        assert!(Gtv::Integer(2).as_boolean().is_err());
    }

    #[test]
    fn test_lookups() {
        let value = Gtv::dict([("list", Gtv::array([1, 2, 3]))]);
        let list = value.get("list").unwrap();
        assert_eq!(list.get_index(2), Some(&Gtv::Integer(3)));
        assert_eq!(list.get_index(3), None);
        assert_eq!(value.get("missing"), None);
        assert_eq!(list.len(), 3);
        assert!(Gtv::Null.is_empty());
    }
}
