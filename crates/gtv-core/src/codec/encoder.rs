//! Value encoding

use super::tag;
use crate::value::Gtv;
use num_bigint::BigInt;

/// Encode a value into a fresh buffer
pub fn encode(value: &Gtv) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

/// Append the encoding of `value` to `out`
pub fn encode_into(value: &Gtv, out: &mut Vec<u8>) {
    let mut inner = Vec::new();
    let outer = match value {
        Gtv::Null => {
            write_tlv(&mut inner, tag::UNIVERSAL_NULL, &[]);
            tag::NULL
        }
        Gtv::ByteArray(bytes) => {
            write_tlv(&mut inner, tag::OCTET_STRING, bytes);
            tag::BYTE_ARRAY
        }
        Gtv::String(s) => {
            write_tlv(&mut inner, tag::UTF8_STRING, s.as_bytes());
            tag::STRING
        }
        Gtv::Integer(i) => {
            write_tlv(&mut inner, tag::UNIVERSAL_INTEGER, &minimal_signed_bytes(*i));
            tag::INTEGER
        }
        Gtv::BigInteger(b) => {
            write_tlv(&mut inner, tag::UNIVERSAL_INTEGER, &big_signed_bytes(b));
            tag::BIG_INTEGER
        }
        Gtv::Array(items) => {
            let mut seq = Vec::new();
            for item in items {
                encode_into(item, &mut seq);
            }
            write_tlv(&mut inner, tag::SEQUENCE, &seq);
            tag::ARRAY
        }
        Gtv::Dict(entries) => {
            let mut seq = Vec::new();
            for (key, item) in entries {
                let mut pair = Vec::new();
                write_tlv(&mut pair, tag::UTF8_STRING, key.as_bytes());
                encode_into(item, &mut pair);
                write_tlv(&mut seq, tag::SEQUENCE, &pair);
            }
            write_tlv(&mut inner, tag::SEQUENCE, &seq);
            tag::DICT
        }
    };
    write_tlv(out, outer, &inner);
}

/// Shortest two's complement big-endian form of `value`
pub fn minimal_signed_bytes(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 && is_redundant(bytes[start], bytes[start + 1]) {
        start += 1;
    }
    bytes[start..].to_vec()
}

pub(crate) fn big_signed_bytes(value: &BigInt) -> Vec<u8> {
    let mut bytes = value.to_signed_bytes_be();
    if bytes.is_empty() {
        bytes.push(0);
    }
    let mut start = 0;
    while start < bytes.len() - 1 && is_redundant(bytes[start], bytes[start + 1]) {
        start += 1;
    }
    bytes.drain(..start);
    bytes
}

/// A leading byte is redundant when it only repeats the sign of the next one
pub(crate) fn is_redundant(first: u8, second: u8) -> bool {
    (first == 0x00 && second & 0x80 == 0) || (first == 0xFF && second & 0x80 != 0)
}

fn write_tlv(out: &mut Vec<u8>, tag: u8, content: &[u8]) {
    out.push(tag);
    write_length(out, content.len());
    out.extend_from_slice(content);
}

fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "00")]
    #[case(1, "01")]
    #[case(127, "7f")]
    #[case(128, "0080")]
    #[case(255, "00ff")]
    #[case(256, "0100")]
    #[case(-1, "ff")]
    #[case(-128, "80")]
    #[case(-129, "ff7f")]
    #[case(i64::MAX, "7fffffffffffffff")]
    #[case(i64::MIN, "8000000000000000")]
    fn test_minimal_signed_bytes(#[case] value: i64, #[case] expected: &str) {
        assert_eq!(hex::encode(minimal_signed_bytes(value)), expected);
        assert_eq!(
            hex::encode(big_signed_bytes(&BigInt::from(value))),
            expected
        );
    }

    #[test]
    fn test_encode_primitives() {
        assert_eq!(hex::encode(encode(&Gtv::Null)), "a0020500");
        assert_eq!(hex::encode(encode(&Gtv::Integer(0))), "a303020100");
        assert_eq!(hex::encode(encode(&Gtv::from("a"))), "a2030c0161");
        assert_eq!(hex::encode(encode(&Gtv::bytes(vec![0x0A]))), "a10304010a");
        assert_eq!(
            hex::encode(encode(&Gtv::BigInteger(BigInt::from(1)))),
            "a603020101"
        );
    }

    #[test]
    fn test_encode_containers() {
        assert_eq!(hex::encode(encode(&Gtv::Array(vec![]))), "a5023000");
        assert_eq!(
            hex::encode(encode(&Gtv::array([1]))),
            "a5073005a303020101"
        );
        assert_eq!(
            hex::encode(encode(&Gtv::dict([("a", 1)]))),
            "a40c300a30080c0161a303020101"
        );
    }

    #[test]
    fn test_long_form_length() {
        let value = Gtv::bytes(vec![0u8; 200]);
        let encoded = encode(&value);
        // outer: a1 81 cb, inner: 04 81 c8
        assert_eq!(&encoded[..6], &[0xA1, 0x81, 0xCB, 0x04, 0x81, 0xC8]);
        assert_eq!(encoded.len(), 6 + 200);
    }

    #[test]
    fn test_dict_encoding_ignores_insertion_order() {
        let a = Gtv::dict([("b", 2), ("a", 1)]);
        let b = Gtv::dict([("a", 1), ("b", 2)]);
        assert_eq!(encode(&a), encode(&b));
    }
}
