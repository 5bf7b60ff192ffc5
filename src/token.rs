//! Tokens produced by the engine
//!
//! A token is a classified, borrowed span of the input. Token streams are
//! contiguous: concatenating the `text` of every token reproduces the input.

pub mod kind;

pub use kind::{TokenKind, TokenKindError};

use serde::Serialize;
use std::ops::Range;

/// One classified span of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Byte offset of the first byte of `text` in the tokenized input
    pub start: usize,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, start: usize, text: &'a str) -> Self {
        Token { kind, start, text }
    }

    /// Byte offset one past the last byte of the token
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_a(TokenKind::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_range_follows_text_length() {
        let token = Token::new(TokenKind::Keyword, 4, "select");
        assert_eq!(token.end(), 10);
        assert_eq!(token.range(), 4..10);
        assert!(!token.is_error());
    }

    #[test]
    fn multibyte_text_uses_byte_offsets() {
        let token = Token::new(TokenKind::Error, 2, "é");
        assert_eq!(token.range(), 2..4);
        assert!(token.is_error());
    }
}
