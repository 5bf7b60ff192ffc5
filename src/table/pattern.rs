//! Anchored pattern matching
//!
//! Rules must match exactly at the cursor; the engine never scans forward.
//! Searching a slice that starts at the cursor would lose the text before it,
//! and with it the meaning of `^`, `\b` and friends. Instead the whole input is
//! searched with the span starting at the cursor and the search anchored there.

use crate::grammar::MatchFlags;
use regex_automata::meta::{BuildError, Regex};
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input};
use std::fmt;
use std::ops::Range;

/// A compiled rule pattern
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    min_len: Option<usize>,
}

impl Pattern {
    pub fn new(source: &str, flags: MatchFlags) -> Result<Self, BuildError> {
        let config = syntax::Config::new()
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multiline_anchors)
            .dot_matches_new_line(flags.dot_matches_newline);
        let regex = Regex::builder().syntax(config).build(source)?;
        let min_len = syntax::parse_with(source, &config)
            .ok()
            .and_then(|hir| hir.properties().minimum_len());

        Ok(Pattern {
            source: source.to_string(),
            regex,
            min_len,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of explicit capture groups (group 0 not counted)
    pub fn group_count(&self) -> usize {
        self.regex.captures_len().saturating_sub(1)
    }

    /// True if the pattern can succeed without consuming anything
    ///
    /// Decided from the parsed pattern, so assertions such as `\b` that only
    /// match next to other text count as empty too.
    pub fn matches_empty(&self) -> bool {
        self.min_len == Some(0)
    }

    /// End offset of a match starting exactly at `at`
    pub fn match_end(&self, haystack: &str, at: usize) -> Option<usize> {
        let input = Input::new(haystack).range(at..).anchored(Anchored::Yes);
        self.regex.search(&input).map(|m| m.end())
    }

    /// Spans of all groups of a match starting exactly at `at`
    ///
    /// Index 0 is the whole match; groups that did not participate are `None`.
    pub fn captures_at(&self, haystack: &str, at: usize) -> Option<Vec<Option<Range<usize>>>> {
        let input = Input::new(haystack).range(at..).anchored(Anchored::Yes);
        let mut caps = self.regex.create_captures();
        self.regex.search_captures(&input, &mut caps);
        if !caps.is_match() {
            return None;
        }

        let groups = (0..self.regex.captures_len())
            .map(|index| caps.get_group(index).map(|span| span.range()))
            .collect();
        Some(groups)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(source: &str) -> Pattern {
        Pattern::new(source, MatchFlags::default()).unwrap()
    }

    #[test]
    fn matches_only_at_the_cursor() {
        let p = pattern("foo");
        assert_eq!(p.match_end("xxfoo", 0), None);
        assert_eq!(p.match_end("xxfoo", 2), Some(5));
    }

    #[test]
    fn anchors_see_surrounding_text() {
        let p = pattern(r"\bin\b");
        assert_eq!(p.match_end("a in", 2), Some(4));
        assert_eq!(p.match_end("ain", 1), None);

        let caret = pattern("^x");
        assert_eq!(caret.match_end("ax", 1), None);
        assert_eq!(caret.match_end("x", 0), Some(1));
    }

    #[test]
    fn multiline_flag_moves_caret_to_line_starts() {
        let p = Pattern::new("^rem", MatchFlags::new().multiline_anchors(true)).unwrap();
        assert_eq!(p.match_end("x\nrem", 2), Some(5));
        assert_eq!(pattern("^rem").match_end("x\nrem", 2), None);
    }

    #[test]
    fn case_insensitive_flag() {
        let p = Pattern::new("select", MatchFlags::new().case_insensitive(true)).unwrap();
        assert_eq!(p.match_end("SeLeCt", 0), Some(6));
    }

    #[test]
    fn first_alternative_wins() {
        let p = pattern("in|int");
        assert_eq!(p.match_end("int", 0), Some(2));
    }

    #[test]
    fn reports_group_spans() {
        let p = pattern(r"(set)(\s+)(\w+)?");
        assert_eq!(p.group_count(), 3);
        let groups = p.captures_at("set foo", 0).unwrap();
        assert_eq!(groups, vec![Some(0..7), Some(0..3), Some(3..4), Some(4..7)]);

        let partial = p.captures_at("set  ", 0).unwrap();
        assert_eq!(partial[3], None);
    }

    #[test]
    fn detects_empty_matches() {
        assert!(pattern("x*").matches_empty());
        assert!(pattern("").matches_empty());
        assert!(!pattern("x+").matches_empty());
        assert!(!pattern(r"\bx").matches_empty());
    }

    #[test]
    fn context_dependent_assertions_count_as_empty() {
        assert!(pattern(r"\b").matches_empty());
        assert!(pattern(r"\B").matches_empty());
        assert!(pattern(r"(?:x|\b)").matches_empty());
        assert!(pattern("^").matches_empty());
        assert!(pattern("$").matches_empty());
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(Pattern::new("(unclosed", MatchFlags::default()).is_err());
        assert!(Pattern::new(r"\d+(?= )", MatchFlags::default()).is_err());
    }
}
