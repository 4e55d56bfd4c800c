//! Recursive-descent parser for the text syntax

use super::lexer::{tokenize, Spanned, Token};
use crate::config::CodecLimits;
use crate::error::{GtvError, Result};
use crate::value::Gtv;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::vec::IntoIter;

/// Parse text using the default limits
pub fn parse(input: &str) -> Result<Gtv> {
    parse_with_limits(input, &CodecLimits::default())
}

/// Parse text, rejecting nesting deeper than `limits.max_depth`
pub fn parse_with_limits(input: &str, limits: &CodecLimits) -> Result<Gtv> {
    let mut parser = Parser {
        tokens: tokenize(input)?.into_iter().peekable(),
        end: input.len(),
        max_depth: limits.max_depth,
    };
    let value = parser.value(0)?;
    if let Some((_, at)) = parser.tokens.next() {
        return Err(error(at, "unexpected trailing input"));
    }
    Ok(value)
}

fn error(position: usize, reason: impl Into<String>) -> GtvError {
    GtvError::Parse {
        position,
        reason: reason.into(),
    }
}

struct Parser {
    tokens: Peekable<IntoIter<Spanned>>,
    end: usize,
    max_depth: usize,
}

impl Parser {
    fn next(&mut self) -> Result<Spanned> {
        self.tokens
            .next()
            .ok_or_else(|| error(self.end, "unexpected end of input"))
    }

    fn peek_is(&mut self, token: &Token) -> bool {
        matches!(self.tokens.peek(), Some((t, _)) if t == token)
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(GtvError::LimitExceeded(format!(
                "nesting deeper than {} levels",
                self.max_depth
            )));
        }
        Ok(())
    }

    fn value(&mut self, depth: usize) -> Result<Gtv> {
        self.enter(depth)?;
        let (token, at) = self.next()?;
        match token {
            Token::Null => Ok(Gtv::Null),
            Token::Integer(i) => Ok(Gtv::Integer(i)),
            Token::BigInteger(b) => Ok(Gtv::BigInteger(b)),
            Token::String(s) => Ok(Gtv::String(s)),
            Token::ByteArray(b) => Ok(Gtv::ByteArray(b)),
            Token::LBracket => self.bracketed(depth),
            Token::LBrace => self.braced(depth),
            other => Err(error(at, format!("unexpected {other:?}"))),
        }
    }

    /// `[a, b]`, or `["k": v]` which is a dictionary
    fn bracketed(&mut self, depth: usize) -> Result<Gtv> {
        if self.peek_is(&Token::RBracket) {
            self.tokens.next();
            return Ok(Gtv::Array(Vec::new()));
        }

        let first = if matches!(self.tokens.peek(), Some((Token::String(_), _))) {
            self.enter(depth + 1)?;
            let (token, at) = self.next()?;
            let Token::String(s) = token else {
                return Err(error(at, "expected string"));
            };
            if self.peek_is(&Token::Colon) {
                self.tokens.next();
                return self.bracketed_dict(s, at, depth);
            }
            Gtv::String(s)
        } else {
            self.value(depth + 1)?
        };

        let mut items = vec![first];
        loop {
            match self.next()? {
                (Token::Comma, _) => items.push(self.value(depth + 1)?),
                (Token::RBracket, _) => return Ok(Gtv::Array(items)),
                (other, at) => return Err(error(at, format!("expected , or ] but found {other:?}"))),
            }
        }
    }

    fn bracketed_dict(&mut self, first_key: String, key_at: usize, depth: usize) -> Result<Gtv> {
        let mut entries = BTreeMap::new();
        let mut key = first_key;
        let mut at = key_at;
        loop {
            let value = self.value(depth + 1)?;
            insert_unique(&mut entries, key, value, at)?;
            match self.next()? {
                (Token::Comma, _) => {}
                (Token::RBracket, _) => return Ok(Gtv::Dict(entries)),
                (other, at) => return Err(error(at, format!("expected , or ] but found {other:?}"))),
            }
            (key, at) = match self.next()? {
                (Token::String(s), at) => (s, at),
                (other, at) => return Err(error(at, format!("expected key but found {other:?}"))),
            };
            match self.next()? {
                (Token::Colon, _) => {}
                (other, at) => return Err(error(at, format!("expected : but found {other:?}"))),
            }
        }
    }

    /// `{"k": v}` or `{k = v}`
    fn braced(&mut self, depth: usize) -> Result<Gtv> {
        let mut entries = BTreeMap::new();
        if self.peek_is(&Token::RBrace) {
            self.tokens.next();
            return Ok(Gtv::Dict(entries));
        }
        loop {
            let (key, at) = match self.next()? {
                (Token::String(s) | Token::Ident(s), at) => (s, at),
                (other, at) => return Err(error(at, format!("expected key but found {other:?}"))),
            };
            match self.next()? {
                (Token::Colon | Token::Equals, _) => {}
                (other, at) => {
                    return Err(error(at, format!("expected : or = but found {other:?}")));
                }
            }
            let value = self.value(depth + 1)?;
            insert_unique(&mut entries, key, value, at)?;
            match self.next()? {
                (Token::Comma, _) => {}
                (Token::RBrace, _) => return Ok(Gtv::Dict(entries)),
                (other, at) => return Err(error(at, format!("expected , or }} but found {other:?}"))),
            }
        }
    }
}

fn insert_unique(
    entries: &mut BTreeMap<String, Gtv>,
    key: String,
    value: Gtv,
    at: usize,
) -> Result<()> {
    if entries.contains_key(&key) {
        return Err(error(at, format!("duplicate key {key:?}")));
    }
    entries.insert(key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse("null").unwrap(), Gtv::Null);
        assert_eq!(parse("123").unwrap(), Gtv::Integer(123));
        assert_eq!(parse("-5").unwrap(), Gtv::Integer(-5));
        assert_eq!(parse("123L").unwrap(), Gtv::BigInteger(BigInt::from(123)));
        assert_eq!(parse(r#"x"0A""#).unwrap(), Gtv::bytes(vec![0x0A]));
        assert_eq!(parse(r#""hi""#).unwrap(), Gtv::from("hi"));
    }

    #[test]
    fn test_parse_containers() {
        assert_eq!(parse("[]").unwrap(), Gtv::Array(vec![]));
        assert_eq!(parse("{}").unwrap(), Gtv::empty_dict());
        assert_eq!(
            parse(r#"[1, "two", [null]]"#).unwrap(),
            Gtv::array([Gtv::Integer(1), Gtv::from("two"), Gtv::array([Gtv::Null])])
        );
    }

    #[test]
    fn test_dictionary_forms_agree() {
        let expected = Gtv::dict([("a", Gtv::Integer(1)), ("b", Gtv::from("x"))]);
        assert_eq!(parse(r#"{"a": 1, "b": "x"}"#).unwrap(), expected);
        assert_eq!(parse(r#"{b = "x", a = 1}"#).unwrap(), expected);
        assert_eq!(parse(r#"["b": "x", "a": 1]"#).unwrap(), expected);
    }

    #[test]
    fn test_string_first_array_is_not_a_dict() {
        assert_eq!(
            parse(r#"["a", "b"]"#).unwrap(),
            Gtv::array([Gtv::from("a"), Gtv::from("b")])
        );
    }

    #[test]
    fn test_parse_errors() {
        for input in ["", "[1,", "[1 2]", "{a 1}", "{1 = 2}", r#"{"a": 1, "a": 2}"#, "1 2", "]"] {
            assert!(
                matches!(parse(input), Err(GtvError::Parse { .. })),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_parse_depth_limit() {
        let deep = "[".repeat(80) + &"]".repeat(80);
        assert!(matches!(parse(&deep), Err(GtvError::LimitExceeded(_))));
        let limits = CodecLimits { max_depth: 100, ..CodecLimits::default() };
        assert!(parse_with_limits(&deep, &limits).is_ok());
    }

    #[test]
    fn test_duplicate_key_position() {
        match parse(r#"{"a": 1, "a": 2}"#) {
            Err(GtvError::Parse { position, .. }) => assert_eq!(position, 9),
            other => panic!("unexpected {other:?}"),
        }
    }
}
