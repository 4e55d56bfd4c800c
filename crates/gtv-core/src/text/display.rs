//! Text rendering
//!
//! `{}` renders on one line, `{:#}` indents nested containers. Both forms
//! parse back to the same value.

use crate::value::Gtv;
use std::fmt::{self, Write};

impl fmt::Display for Gtv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = if f.alternate() { Some(0) } else { None };
        write_value(f, self, indent)
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Gtv, indent: Option<usize>) -> fmt::Result {
    match value {
        Gtv::Null => f.write_str("null"),
        Gtv::Integer(i) => write!(f, "{i}"),
        Gtv::BigInteger(b) => write!(f, "{b}L"),
        Gtv::String(s) => write_quoted(f, s),
        Gtv::ByteArray(b) => write!(f, "x\"{}\"", hex::encode(b)),
        Gtv::Array(items) => {
            if items.is_empty() {
                return f.write_str("[]");
            }
            f.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                separator(f, i, indent)?;
                write_value(f, item, indent.map(|n| n + 1))?;
            }
            close(f, indent, ']')
        }
        Gtv::Dict(entries) => {
            if entries.is_empty() {
                return f.write_str("{}");
            }
            f.write_char('{')?;
            for (i, (key, item)) in entries.iter().enumerate() {
                separator(f, i, indent)?;
                write_quoted(f, key)?;
                f.write_str(": ")?;
                write_value(f, item, indent.map(|n| n + 1))?;
            }
            close(f, indent, '}')
        }
    }
}

fn separator(f: &mut fmt::Formatter<'_>, index: usize, indent: Option<usize>) -> fmt::Result {
    match indent {
        Some(level) => {
            if index > 0 {
                f.write_char(',')?;
            }
            f.write_char('\n')?;
            pad(f, level + 1)
        }
        None if index > 0 => f.write_str(", "),
        None => Ok(()),
    }
}

fn close(f: &mut fmt::Formatter<'_>, indent: Option<usize>, bracket: char) -> fmt::Result {
    if let Some(level) = indent {
        f.write_char('\n')?;
        pad(f, level)?;
    }
    f.write_char(bracket)
}

fn pad(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    for _ in 0..level {
        f.write_str("  ")?;
    }
    Ok(())
}

/// Write `s` as a double-quoted literal the lexer reads back unchanged
pub(crate) fn write_quoted<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            '\u{8}' => out.write_str("\\b")?,
            '\u{c}' => out.write_str("\\f")?,
            c if c.is_control() && (c as u32) <= 0xFFFF => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
