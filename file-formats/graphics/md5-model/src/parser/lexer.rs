//! Tokenizer for the MD5 text formats

use crate::error::{Md5Error, Result};
use glam::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TokenKind<'a> {
    /// Bare keyword or number
    Word(&'a str),
    /// Contents of a double-quoted string, quotes stripped
    Quoted(&'a str),
    /// One of `{ } ( )`
    Punct(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub line: usize,
}

impl std::fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Word(w) => write!(f, "'{w}'"),
            TokenKind::Quoted(s) => write!(f, "\"{s}\""),
            TokenKind::Punct(c) => write!(f, "'{c}'"),
        }
    }
}

fn is_punct(c: char) -> bool {
    matches!(c, '{' | '}' | '(' | ')')
}

/// Split `src` into tokens, dropping `//` comments
fn tokenize(src: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let bytes = src.as_bytes();
    let mut line = 1;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c == '\n' {
            line += 1;
            i += 1;
        } else if c.is_ascii_whitespace() {
            i += 1;
        } else if c == '/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if is_punct(c) {
            tokens.push(Token {
                kind: TokenKind::Punct(c),
                line,
            });
            i += 1;
        } else if c == '"' {
            let start_line = line;
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end] != b'"' {
                if bytes[end] == b'\n' {
                    line += 1;
                }
                end += 1;
            }
            if end >= bytes.len() {
                return Err(Md5Error::parse(start_line, "unterminated quoted string"));
            }
            tokens.push(Token {
                kind: TokenKind::Quoted(&src[start..end]),
                line: start_line,
            });
            i = end + 1;
        } else {
            let start = i;
            while i < bytes.len() {
                let b = bytes[i];
                if b.is_ascii_whitespace() || is_punct(b as char) || b == b'"' {
                    break;
                }
                if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
                    break;
                }
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Word(&src[start..i]),
                line,
            });
        }
    }

    Ok(tokens)
}

/// Cursor over the token stream with typed `expect_*` readers
pub(crate) struct Lexer<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    last_line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(src)?,
            pos: 0,
            last_line: 1,
        })
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Tokens not yet consumed
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    /// Line of the most recently consumed token
    pub fn line(&self) -> usize {
        self.last_line
    }

    pub fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    /// True if the next token is the given punctuation
    pub fn at_punct(&self, c: char) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Punct(c))
    }

    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let token = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or_else(|| Md5Error::parse(self.last_line, "unexpected end of file"))?;
        self.pos += 1;
        self.last_line = token.line;
        Ok(token)
    }

    pub fn error(&self, message: impl Into<String>) -> Md5Error {
        Md5Error::parse(self.last_line, message)
    }

    pub fn expect_word(&mut self) -> Result<&'a str> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::Word(w) => Ok(w),
            other => Err(Md5Error::parse(
                token.line,
                format!("expected a value, found {other}"),
            )),
        }
    }

    /// A quoted string; bare words are accepted too
    pub fn expect_string(&mut self) -> Result<&'a str> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::Quoted(s) | TokenKind::Word(s) => Ok(s),
            other => Err(Md5Error::parse(
                token.line,
                format!("expected a string, found {other}"),
            )),
        }
    }

    pub fn expect_punct(&mut self, c: char) -> Result<()> {
        let token = self.next_token()?;
        if token.kind == TokenKind::Punct(c) {
            Ok(())
        } else {
            Err(Md5Error::parse(
                token.line,
                format!("expected '{c}', found {}", token.kind),
            ))
        }
    }

    fn expect_number<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
        let word = self.expect_word()?;
        word.parse::<T>()
            .map_err(|_| self.error(format!("malformed {what} '{word}'")))
    }

    pub fn expect_f32(&mut self) -> Result<f32> {
        self.expect_number("number")
    }

    pub fn expect_i32(&mut self) -> Result<i32> {
        self.expect_number("integer")
    }

    pub fn expect_u32(&mut self) -> Result<u32> {
        self.expect_number("unsigned integer")
    }

    pub fn expect_usize(&mut self) -> Result<usize> {
        self.expect_number("count")
    }

    /// A declared element count, rejected when the rest of the input is too
    /// short to hold that many elements of at least `min_tokens` each
    pub fn expect_count(&mut self, keyword: &str, min_tokens: usize) -> Result<usize> {
        let count = self.expect_usize()?;
        if count
            .checked_mul(min_tokens)
            .is_none_or(|needed| needed > self.remaining())
        {
            return Err(self.error(format!(
                "{keyword} {count} is more than the remaining {} tokens can hold",
                self.remaining()
            )));
        }
        Ok(count)
    }

    /// `( x y )`
    pub fn expect_vec2(&mut self) -> Result<Vec2> {
        self.expect_punct('(')?;
        let v = Vec2::new(self.expect_f32()?, self.expect_f32()?);
        self.expect_punct(')')?;
        Ok(v)
    }

    /// `( x y z )`
    pub fn expect_vec3(&mut self) -> Result<Vec3> {
        self.expect_punct('(')?;
        let v = Vec3::new(self.expect_f32()?, self.expect_f32()?, self.expect_f32()?);
        self.expect_punct(')')?;
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind<'_>> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_punctuation_splits_words() {
        assert_eq!(
            kinds("(0 1.5 -2)"),
            vec![
                TokenKind::Punct('('),
                TokenKind::Word("0"),
                TokenKind::Word("1.5"),
                TokenKind::Word("-2"),
                TokenKind::Punct(')'),
            ]
        );
    }

    #[test]
    fn test_quoted_string_keeps_spaces() {
        assert_eq!(
            kinds("commandline \"mesh models/a b.ma\""),
            vec![
                TokenKind::Word("commandline"),
                TokenKind::Quoted("mesh models/a b.ma"),
            ]
        );
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = tokenize("a // ignored ( }\n\nb//tail\nc").unwrap();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
        assert_eq!(tokens[1].kind, TokenKind::Word("b"));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("\nshader \"oops").unwrap_err();
        assert!(matches!(err, Md5Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_expect_helpers() {
        let mut lexer = Lexer::new("12 -1 ( 0.5 1 ) ( 1 2 3 ) \"name\" {").unwrap();
        assert_eq!(lexer.expect_usize().unwrap(), 12);
        assert_eq!(lexer.expect_i32().unwrap(), -1);
        assert_eq!(lexer.expect_vec2().unwrap(), Vec2::new(0.5, 1.0));
        assert_eq!(lexer.expect_vec3().unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(lexer.expect_string().unwrap(), "name");
        assert!(lexer.at_punct('{'));
        lexer.expect_punct('{').unwrap();
        assert!(lexer.is_eof());
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_malformed_number_reports_line() {
        let mut lexer = Lexer::new("numverts\n1x").unwrap();
        lexer.expect_word().unwrap();
        match lexer.expect_usize().unwrap_err() {
            Md5Error::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("1x"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_count_bounded_by_remaining_tokens() {
        let mut lexer = Lexer::new("2 tri 0 0 1 2 tri 1 2 1 3").unwrap();
        assert_eq!(lexer.expect_count("numtris", 5).unwrap(), 2);
        assert_eq!(lexer.remaining(), 10);

        let mut lexer = Lexer::new("3 tri 0 0 1 2").unwrap();
        assert!(matches!(
            lexer.expect_count("numtris", 5),
            Err(Md5Error::Parse { line: 1, .. })
        ));

        let mut lexer = Lexer::new("18446744073709551615").unwrap();
        assert!(lexer.expect_count("numverts", 8).is_err());
    }
}
