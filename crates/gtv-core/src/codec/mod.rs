//! Canonical binary codec
//!
//! Values are written as DER-style tag-length-value records. Every value is
//! wrapped in an outer context tag naming its GTV type; the payload inside is
//! a universal ASN.1 element. The mapping is fixed for interoperability:
//!
//! | Value      | Outer | Inner                                         |
//! |------------|-------|-----------------------------------------------|
//! | Null       | `A0`  | `05 00`                                       |
//! | ByteArray  | `A1`  | `04` octet string                             |
//! | String     | `A2`  | `0C` UTF-8 string                             |
//! | Integer    | `A3`  | `02` minimal two's complement                 |
//! | Dict       | `A4`  | `30` sequence of `30 { 0C key, value }`       |
//! | Array      | `A5`  | `30` sequence of values                       |
//! | BigInteger | `A6`  | `02` minimal two's complement                 |
//!
//! Lengths use the definite form with the fewest possible bytes. Dictionary
//! entries are written in ascending key order.

mod decoder;
mod encoder;
mod stream;

pub use decoder::{decode, decode_prefix, decode_with_limits};
pub use encoder::{encode, encode_into, minimal_signed_bytes};
pub(crate) use encoder::big_signed_bytes;
pub use stream::{GtvStreamReader, GtvStreamWriter};

use crate::error::Result;
use crate::value::Gtv;

pub(crate) mod tag {
    pub const NULL: u8 = 0xA0;
    pub const BYTE_ARRAY: u8 = 0xA1;
    pub const STRING: u8 = 0xA2;
    pub const INTEGER: u8 = 0xA3;
    pub const DICT: u8 = 0xA4;
    pub const ARRAY: u8 = 0xA5;
    pub const BIG_INTEGER: u8 = 0xA6;

    pub const UNIVERSAL_INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    pub const UNIVERSAL_NULL: u8 = 0x05;
    pub const UTF8_STRING: u8 = 0x0C;
    pub const SEQUENCE: u8 = 0x30;
}

impl Gtv {
    /// Canonical binary encoding of this value
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }

    /// Decode a complete buffer with the default limits
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }
}
