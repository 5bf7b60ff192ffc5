//! Helpers for testing grammars
//!
//! Every grammar should keep the stream invariants for any input, not only
//! for the samples it was written against. [`assert_total_coverage`] checks
//! them; [`render`] gives a stable one-token-per-line dump that reads well in
//! snapshots:
//!
//! ```text
//! Keyword          "set"
//! Text             " "
//! Name             "foo"
//! ```

use crate::token::{Token, TokenKind};
use std::fmt::Write;

/// Panic unless `tokens` cover `input` contiguously, in order, with no empty
/// tokens
pub fn assert_total_coverage(input: &str, tokens: &[Token<'_>]) {
    let mut offset = 0;
    for (index, token) in tokens.iter().enumerate() {
        assert_eq!(
            token.start, offset,
            "token {index} ({:?}) starts at {} but the previous token ended at {offset}",
            token.kind, token.start
        );
        assert!(!token.text.is_empty(), "token {index} ({:?}) is empty", token.kind);
        assert_eq!(
            &input[token.range()],
            token.text,
            "token {index} text does not match the input at {:?}",
            token.range()
        );
        offset = token.end();
    }
    assert_eq!(offset, input.len(), "tokens stop at {offset} of {}", input.len());
}

/// `(kind, text)` pairs, the usual shape for assertions
pub fn pairs<'a, I>(tokens: I) -> Vec<(TokenKind, &'a str)>
where
    I: IntoIterator<Item = Token<'a>>,
{
    tokens.into_iter().map(|token| (token.kind, token.text)).collect()
}

/// Merge runs of same-kind tokens, as highlighters usually do before output
pub fn merge_adjacent<'a>(input: &'a str, tokens: &[Token<'a>]) -> Vec<Token<'a>> {
    let mut merged: Vec<Token<'a>> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match merged.last_mut() {
            Some(last) if last.kind == token.kind && last.end() == token.start => {
                last.text = &input[last.start..token.end()];
            }
            _ => merged.push(*token),
        }
    }
    merged
}

/// One line per token: kind, then the text as a debug string
pub fn render<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = Token<'a>>,
{
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(out, "{:<16} {:?}", token.kind.name(), token.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pads_kinds() {
        let tokens = [
            Token::new(TokenKind::Keyword, 0, "set"),
            Token::new(TokenKind::Text, 3, " "),
        ];
        assert_eq!(render(tokens), "Keyword          \"set\"\nText             \" \"\n");
    }

    #[test]
    fn merges_runs_of_one_kind() {
        let input = "ab c";
        let tokens = [
            Token::new(TokenKind::Name, 0, "a"),
            Token::new(TokenKind::Name, 1, "b"),
            Token::new(TokenKind::Text, 2, " "),
            Token::new(TokenKind::Name, 3, "c"),
        ];
        assert_eq!(
            pairs(merge_adjacent(input, &tokens)),
            vec![
                (TokenKind::Name, "ab"),
                (TokenKind::Text, " "),
                (TokenKind::Name, "c")
            ]
        );
    }

    #[test]
    #[should_panic(expected = "starts at 2")]
    fn gaps_are_caught() {
        let tokens = [
            Token::new(TokenKind::Name, 0, "a"),
            Token::new(TokenKind::Name, 2, "c"),
        ];
        assert_total_coverage("abc", &tokens);
    }
}
