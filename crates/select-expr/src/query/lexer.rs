//! Tokenizer for boolean selector expressions.

use std::fmt;

use logos::Logos;

use crate::error::{Result, SelectError};

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

/// A token of the boolean layer.
///
/// `Literal` text keeps the whitespace around it: whitespace is a
/// combinator in selector syntax, so adjacent literal runs are later glued
/// back together verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Not,
    And,
    Or,
    LParen,
    RParen,
    Quote(char),
    Literal(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Not => write!(f, "not"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Quote(quote) => write!(f, "{quote}"),
            Token::Literal(text) => write!(f, "{text}"),
        }
    }
}

// Keywords only match when followed by whitespace, so `nothing` or
// `order` stay selector text.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"\s+")]
    Whitespace,

    #[regex(r"not\s+", priority = 10)]
    Not,

    #[regex(r"and\s+", priority = 10)]
    And,

    #[regex(r"or\s+", priority = 10)]
    Or,

    #[regex(r"\(\s*")]
    LParen,

    #[regex(r"\)\s*")]
    RParen,

    #[token("\"")]
    DoubleQuote,

    #[token("'")]
    SingleQuote,

    #[regex(r#"[^\s'"()]+\s*"#)]
    Literal,
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// A cursor over the remaining expression text.
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, RawToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: RawToken::lexer(source),
        }
    }

    /// Input not consumed yet.
    pub fn remaining(&self) -> &'a str {
        self.inner.remainder()
    }

    /// Scans a quoted string whose opening `quote` was just returned as
    /// [`Token::Quote`], and returns it as a double-quoted literal.
    ///
    /// A quote preceded by a backslash does not terminate the string. The
    /// content of single-quoted strings gets its `"` characters escaped.
    pub fn scan_quoted(&mut self, quote: char) -> Result<Token> {
        let rest = self.inner.remainder();
        let mut content = String::new();
        let mut chars = rest.char_indices().peekable();

        while let Some((offset, ch)) = chars.next() {
            if ch == '\\' {
                if let Some(&(_, next)) = chars.peek() {
                    if next == quote {
                        content.push(ch);
                        content.push(next);
                        chars.next();
                        continue;
                    }
                }
            }
            if ch == quote {
                self.inner.bump(offset + ch.len_utf8());
                let content = if quote == '\'' {
                    content.replace('"', "\\\"")
                } else {
                    content
                };
                return Ok(Token::Literal(format!("\"{content}\"")));
            }
            content.push(ch);
        }

        Err(SelectError::UnterminatedQuote {
            quote,
            remaining: rest.to_string(),
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Returns the next token, or `None` once only whitespace remains.
    fn next(&mut self) -> Option<Token> {
        let mut leading: Option<usize> = None;

        loop {
            let raw = self.inner.next()?;
            let span = self.inner.span();
            let token = match raw {
                Ok(RawToken::Whitespace) => {
                    leading.get_or_insert(span.start);
                    continue;
                }
                Ok(RawToken::Not) => Token::Not,
                Ok(RawToken::And) => Token::And,
                Ok(RawToken::Or) => Token::Or,
                Ok(RawToken::LParen) => Token::LParen,
                Ok(RawToken::RParen) => Token::RParen,
                Ok(RawToken::DoubleQuote) => Token::Quote('"'),
                Ok(RawToken::SingleQuote) => Token::Quote('\''),
                Ok(RawToken::Literal) | Err(()) => {
                    let start = leading.unwrap_or(span.start);
                    Token::Literal(self.source[start..span.end].to_string())
                }
            };
            return Some(token);
        }
    }
}
