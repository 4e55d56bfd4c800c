//! Value decoding
//!
//! The decoder accepts exactly the canonical form the encoder produces, with
//! one relaxation: dictionary entries may arrive in any order and are
//! normalized on the way in. Everything else that is not canonical is
//! rejected with the byte offset where it was found.

use super::encoder::is_redundant;
use super::tag;
use crate::config::CodecLimits;
use crate::error::{GtvError, Result};
use crate::value::Gtv;
use num_bigint::BigInt;
use std::collections::BTreeMap;

/// Decode a complete buffer using the default limits
pub fn decode(bytes: &[u8]) -> Result<Gtv> {
    decode_with_limits(bytes, &CodecLimits::default())
}

/// Decode a complete buffer; trailing bytes are an error
pub fn decode_with_limits(bytes: &[u8], limits: &CodecLimits) -> Result<Gtv> {
    let (value, consumed) = decode_prefix(bytes, limits)?;
    if consumed != bytes.len() {
        return Err(GtvError::malformed(
            consumed,
            format!("{} trailing bytes after value", bytes.len() - consumed),
        ));
    }
    Ok(value)
}

/// Decode the first value in `bytes`, returning it with the number of bytes used
pub fn decode_prefix(bytes: &[u8], limits: &CodecLimits) -> Result<(Gtv, usize)> {
    let mut probe = Reader::new(bytes, 0);
    probe.read_u8()?;
    let len = probe.read_length()?;
    let total = probe.pos.saturating_add(len);
    if total > limits.max_bytes {
        return Err(GtvError::LimitExceeded(format!(
            "encoded value of {total} bytes exceeds {} bytes",
            limits.max_bytes
        )));
    }

    let mut reader = Reader::new(bytes, 0);
    let value = reader.read_value(limits, 0)?;
    Ok((value, reader.pos))
}

/// Cursor over one element's content; `base` is the absolute offset of `buf[0]`
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(GtvError::malformed(
                self.offset(),
                format!("{} unexpected bytes inside element", self.buf.len() - self.pos),
            ))
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| GtvError::malformed(self.offset(), "truncated input"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.buf.len() - self.pos;
        if len > available {
            return Err(GtvError::malformed(
                self.offset(),
                format!("truncated input: need {len} bytes, {available} available"),
            ));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_length(&mut self) -> Result<usize> {
        let offset = self.offset();
        let first = self.read_u8()?;
        if first < 0x80 {
            return Ok(first as usize);
        }
        if first == 0x80 {
            return Err(GtvError::malformed(offset, "indefinite length"));
        }

        let count = (first & 0x7F) as usize;
        if count > std::mem::size_of::<usize>() {
            return Err(GtvError::malformed(offset, "length does not fit in memory"));
        }
        let bytes = self.read_bytes(count)?;
        if bytes[0] == 0 {
            return Err(GtvError::malformed(offset, "non-minimal length"));
        }
        let len = bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
        if len < 0x80 {
            return Err(GtvError::malformed(offset, "long form used for short length"));
        }
        Ok(len)
    }

    fn read_any(&mut self) -> Result<(u8, Reader<'a>)> {
        let tag = self.read_u8()?;
        let len = self.read_length()?;
        let start = self.offset();
        let content = self.read_bytes(len)?;
        Ok((tag, Reader::new(content, start)))
    }

    fn read_element(&mut self, expected: u8) -> Result<Reader<'a>> {
        let offset = self.offset();
        let (found, content) = self.read_any()?;
        if found != expected {
            return Err(GtvError::malformed(
                offset,
                format!("expected tag 0x{expected:02x}, found 0x{found:02x}"),
            ));
        }
        Ok(content)
    }

    fn read_utf8(&mut self) -> Result<String> {
        let content = self.read_element(tag::UTF8_STRING)?;
        String::from_utf8(content.rest().to_vec())
            .map_err(|e| GtvError::malformed(content.offset(), format!("invalid UTF-8: {e}")))
    }

    fn read_value(&mut self, limits: &CodecLimits, depth: usize) -> Result<Gtv> {
        if depth > limits.max_depth {
            return Err(GtvError::LimitExceeded(format!(
                "nesting deeper than {} levels",
                limits.max_depth
            )));
        }

        let start = self.offset();
        let (outer, mut body) = self.read_any()?;
        let value = match outer {
            tag::NULL => {
                body.read_element(tag::UNIVERSAL_NULL)?.finish()?;
                Gtv::Null
            }
            tag::BYTE_ARRAY => Gtv::ByteArray(body.read_element(tag::OCTET_STRING)?.rest().to_vec()),
            tag::STRING => Gtv::String(body.read_utf8()?),
            tag::INTEGER => {
                let content = body.read_element(tag::UNIVERSAL_INTEGER)?;
                Gtv::Integer(parse_i64(&content)?)
            }
            tag::BIG_INTEGER => {
                let content = body.read_element(tag::UNIVERSAL_INTEGER)?;
                check_minimal(&content)?;
                Gtv::BigInteger(BigInt::from_signed_bytes_be(content.rest()))
            }
            tag::ARRAY => {
                let mut seq = body.read_element(tag::SEQUENCE)?;
                let mut items = Vec::new();
                while !seq.is_empty() {
                    items.push(seq.read_value(limits, depth + 1)?);
                }
                Gtv::Array(items)
            }
            tag::DICT => {
                let mut seq = body.read_element(tag::SEQUENCE)?;
                let mut entries = BTreeMap::new();
                while !seq.is_empty() {
                    let entry_offset = seq.offset();
                    let mut pair = seq.read_element(tag::SEQUENCE)?;
                    let key = pair.read_utf8()?;
                    let item = pair.read_value(limits, depth + 1)?;
                    pair.finish()?;
                    if entries.contains_key(&key) {
                        return Err(GtvError::malformed(
                            entry_offset,
                            format!("duplicate dictionary key {key:?}"),
                        ));
                    }
                    entries.insert(key, item);
                }
                Gtv::Dict(entries)
            }
            other => {
                return Err(GtvError::malformed(start, format!("unknown tag 0x{other:02x}")));
            }
        };
        body.finish()?;
        Ok(value)
    }
}

fn check_minimal(content: &Reader<'_>) -> Result<()> {
    let bytes = content.rest();
    if bytes.is_empty() {
        return Err(GtvError::malformed(content.offset(), "empty integer"));
    }
    if bytes.len() > 1 && is_redundant(bytes[0], bytes[1]) {
        return Err(GtvError::malformed(content.offset(), "non-minimal integer"));
    }
    Ok(())
}

fn parse_i64(content: &Reader<'_>) -> Result<i64> {
    check_minimal(content)?;
    let bytes = content.rest();
    if bytes.len() > 8 {
        return Err(GtvError::malformed(
            content.offset(),
            "integer does not fit in 64 bits",
        ));
    }
    let init: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    Ok(bytes.iter().fold(init, |acc, &b| (acc << 8) | b as i64))
}
