//! Tokenizer for the text syntax

use crate::error::{GtvError, Result};
use num_bigint::BigInt;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Equals,
    Null,
    Integer(i64),
    BigInteger(BigInt),
    String(String),
    ByteArray(Vec<u8>),
    Ident(String),
}

/// A token with the character offset it starts at
pub(crate) type Spanned = (Token, usize);

pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    Lexer {
        chars: input.char_indices().collect(),
        pos: 0,
        len: input.len(),
    }
    .run()
}

/// Read a double-quoted literal at the start of `input`, returning the string
/// and the number of bytes it occupied
pub(crate) fn read_string_literal(input: &str) -> Result<(String, usize)> {
    let mut lexer = Lexer {
        chars: input.char_indices().collect(),
        pos: 0,
        len: input.len(),
    };
    if lexer.peek() != Some('"') {
        return Err(error(0, "expected '\"'"));
    }
    let s = lexer.string()?;
    Ok((s, lexer.offset()))
}

struct Lexer {
    chars: Vec<(usize, char)>,
    pos: usize,
    len: usize,
}

fn error(position: usize, reason: impl Into<String>) -> GtvError {
    GtvError::Parse {
        position,
        reason: reason.into(),
    }
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or(self.len, |&(i, _)| i)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn run(mut self) -> Result<Vec<Spanned>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            let start = self.offset();
            let token = match c {
                c if c.is_whitespace() => {
                    self.pos += 1;
                    continue;
                }
                '[' => self.single(Token::LBracket),
                ']' => self.single(Token::RBracket),
                '{' => self.single(Token::LBrace),
                '}' => self.single(Token::RBrace),
                ',' => self.single(Token::Comma),
                ':' => self.single(Token::Colon),
                '=' => self.single(Token::Equals),
                '"' => Token::String(self.string()?),
                'x' if self.peek_at(1) == Some('"') => {
                    self.pos += 1;
                    let digits = self.string()?;
                    let bytes = hex::decode(&digits)
                        .map_err(|e| error(start, format!("invalid byte array literal: {e}")))?;
                    Token::ByteArray(bytes)
                }
                '-' | '0'..='9' => self.number(start)?,
                c if c.is_alphabetic() || c == '_' => {
                    let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
                    if word == "null" {
                        Token::Null
                    } else {
                        Token::Ident(word)
                    }
                }
                other => return Err(error(start, format!("unexpected character {other:?}"))),
            };
            tokens.push((token, start));
        }
        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|&c| pred(c)) {
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn number(&mut self, start: usize) -> Result<Token> {
        let mut literal = String::new();
        if self.peek() == Some('-') {
            literal.push('-');
            self.pos += 1;
        }
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(error(start, "expected digits"));
        }
        literal.push_str(&digits);

        if self.peek() == Some('L') {
            self.pos += 1;
            let value: BigInt = literal
                .parse()
                .map_err(|_| error(start, format!("invalid big integer {literal}")))?;
            return Ok(Token::BigInteger(value));
        }
        literal
            .parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| error(start, format!("integer {literal} out of range, use the L suffix")))
    }

    fn string(&mut self) -> Result<String> {
        let start = self.offset();
        self.pos += 1;
        let mut out = String::new();
        loop {
            let c = self
                .bump()
                .ok_or_else(|| error(start, "unterminated string"))?;
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let escape_at = self.offset();
                    let escaped = self
                        .bump()
                        .ok_or_else(|| error(start, "unterminated string"))?;
                    match escaped {
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        '\\' => out.push('\\'),
                        '/' => out.push('/'),
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'u' => out.push(self.unicode_escape(escape_at)?),
                        other => {
                            return Err(error(escape_at, format!("unknown escape \\{other}")));
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self, at: usize) -> Result<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| error(at, "expected four hex digits after \\u"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| error(at, format!("invalid code point U+{code:04X}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokens() {
        assert_eq!(
            kinds(r#"[null, -5, 7L, x"0aFF", "s", key = {}]"#),
            vec![
                Token::LBracket,
                Token::Null,
                Token::Comma,
                Token::Integer(-5),
                Token::Comma,
                Token::BigInteger(BigInt::from(7)),
                Token::Comma,
                Token::ByteArray(vec![0x0A, 0xFF]),
                Token::Comma,
                Token::String("s".into()),
                Token::Comma,
                Token::Ident("key".into()),
                Token::Equals,
                Token::LBrace,
                Token::RBrace,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\c\n\u0041""#),
            vec![Token::String("a\"b\\c\nA".into())]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("  [ 12").unwrap();
        assert_eq!(tokens[0].1, 2);
        assert_eq!(tokens[1].1, 4);
    }

    #[test]
    fn test_lexer_errors() {
        assert!(tokenize(r#""open"#).is_err());
        assert!(tokenize("99999999999999999999").is_err());
        assert!(tokenize(r#"x"abc""#).is_err());
        assert!(tokenize("#").is_err());
        assert!(tokenize(r#""\q""#).is_err());
    }
}
