//! Human-readable text syntax
//!
//! ```text
//! null  123  -5  123L  x"0A"  "escaped \"string\""
//! [1, 2]   {"key": value}   {key = value}   ["key": value]
//! ```
//!
//! `L` marks a big integer. Dictionaries have three spellings on input and are
//! always printed as `{"key": value}`.

mod display;
mod lexer;
mod parser;

pub use parser::{parse, parse_with_limits};

pub(crate) use display::write_quoted;
pub(crate) use lexer::read_string_literal;

use crate::error::GtvError;
use crate::value::Gtv;
use std::str::FromStr;

impl FromStr for Gtv {
    type Err = GtvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
