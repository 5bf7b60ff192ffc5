//! The scanning engine
//!
//! A [`TokenStream`] is one scan of one input with one table. Each call to
//! `next` does just enough work to produce a token:
//!
//! 1. Tokens already produced by an earlier step are handed out first
//! 2. Otherwise the rules of the state on top of the stack are tried in order,
//!    anchored at the cursor, and the first match wins
//! 3. The winning rule's action turns the match into tokens (or nested scans),
//!    its transition updates the stack, and the cursor moves past the match
//! 4. If no rule matches, one character becomes an `Error` token
//!
//! The stream always covers the whole input: every byte ends up in exactly one
//! token, in input order.
//!
//! Delegated spans are scanned by a nested stream with its own stack, queued
//! in place. Nested streams are just as lazy as the outer one; nothing inside
//! them runs until the consumer gets there.

mod pieces;
pub mod stack;

pub use stack::StateStack;

use crate::table::{Action, GroupRule, LexerHandle, Rule, StateId, StateTable, TableId, TableSet};
use crate::token::{Token, TokenKind};
use pieces::{normalize, Segment};
use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::ops::Range;
use std::sync::Arc;
use tracing::{trace, warn};

/// Scan `text` with table `id` of `set`
pub fn tokenize<'a>(set: &'a TableSet, id: TableId, text: &'a str) -> TokenStream<'a> {
    TokenStream::new(set, id, text)
}

/// What a callback sees of the match it is asked to classify
///
/// Offsets are byte offsets into [`MatchContext::input`], the text of the scan
/// the match belongs to. For nested scans that is the delegated span, not the
/// outermost input.
#[derive(Debug)]
pub struct MatchContext<'a> {
    input: &'a str,
    groups: &'a [Option<Range<usize>>],
    state: &'a str,
    stack_depth: usize,
}

impl<'a> MatchContext<'a> {
    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn range(&self) -> Range<usize> {
        self.group_range(0).unwrap_or(0..0)
    }

    /// Offset the match starts at
    pub fn offset(&self) -> usize {
        self.range().start
    }

    pub fn as_str(&self) -> &'a str {
        &self.input[self.range()]
    }

    /// Span of capture group `index`; group 0 is the whole match
    pub fn group_range(&self, index: usize) -> Option<Range<usize>> {
        self.groups.get(index).cloned().flatten()
    }

    pub fn group(&self, index: usize) -> Option<&'a str> {
        self.group_range(index).map(|range| &self.input[range])
    }

    /// Number of explicit capture groups
    pub fn group_count(&self) -> usize {
        self.groups.len().saturating_sub(1)
    }

    /// Name of the state the rule ran in
    pub fn state(&self) -> &'a str {
        self.state
    }

    pub fn stack_depth(&self) -> usize {
        self.stack_depth
    }
}

enum Pending<'a> {
    Token(Token<'a>),
    Nested(Box<TokenStream<'a>>),
}

enum Part<'a> {
    Kind(TokenKind),
    Delegate(&'a LexerHandle),
}

/// A lazy scan over one input
pub struct TokenStream<'a> {
    set: &'a TableSet,
    table: TableId,
    input: &'a str,
    /// Offset of `input` inside the outermost input
    base: usize,
    cursor: usize,
    stack: StateStack,
    pending: VecDeque<Pending<'a>>,
    depth: usize,
    empty_steps: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(set: &'a TableSet, table: TableId, input: &'a str) -> Self {
        Self::nested(set, table, input, 0, 0, None)
    }

    fn nested(
        set: &'a TableSet,
        table: TableId,
        input: &'a str,
        base: usize,
        depth: usize,
        start: Option<StateId>,
    ) -> Self {
        let mut stack = StateStack::new(set.table(table).root());
        if let Some(state) = start {
            stack.push(state);
        }
        TokenStream {
            set,
            table,
            input,
            base,
            cursor: 0,
            stack,
            pending: VecDeque::new(),
            depth,
            empty_steps: 0,
        }
    }

    pub fn table(&self) -> &'a StateTable {
        self.set.table(self.table)
    }

    /// The stack of this scan (nested scans have their own)
    pub fn stack(&self) -> &StateStack {
        &self.stack
    }

    /// Byte offset of the next unscanned byte, in outermost input coordinates
    pub fn offset(&self) -> usize {
        self.base + self.cursor
    }

    fn step(&mut self) {
        let table = self.set.table(self.table);
        let top = self.stack.top();
        let rules: &'a [Arc<Rule>] = table.rules(top);

        let found = rules.iter().find_map(|rule| {
            let rule: &'a Rule = rule;
            if rule.needs_groups() {
                let groups = rule.pattern().captures_at(self.input, self.cursor)?;
                let end = groups.first().cloned().flatten()?.end;
                Some((rule, end, groups))
            } else {
                let end = rule.pattern().match_end(self.input, self.cursor)?;
                Some((rule, end, Vec::new()))
            }
        });

        let Some((rule, end, groups)) = found else {
            trace!(
                table = table.name(),
                state = table.state_name(top),
                at = self.offset(),
                "no rule matched"
            );
            self.empty_steps = 0;
            self.push_error_char();
            return;
        };

        let span = self.cursor..end;
        trace!(
            table = table.name(),
            state = table.state_name(top),
            pattern = rule.pattern().as_str(),
            start = self.base + span.start,
            end = self.base + span.end,
            "rule matched"
        );

        if span.is_empty() {
            self.empty_steps += 1;
        } else {
            self.empty_steps = 0;
        }

        self.run_action(rule, span, &groups);
        if !self.stack.apply(rule.ops()) {
            trace!(table = table.name(), "pop clamped at the bottom of the stack");
        }
        self.cursor = end;

        if self.empty_steps > self.set.options().max_empty_steps {
            warn!(
                table = table.name(),
                state = table.state_name(self.stack.top()),
                at = self.offset(),
                steps = self.empty_steps,
                "too many zero-width matches in a row, skipping one character"
            );
            self.empty_steps = 0;
            self.push_error_char();
        }
    }

    fn run_action(&mut self, rule: &'a Rule, span: Range<usize>, groups: &[Option<Range<usize>>]) {
        if span.is_empty() {
            return;
        }

        match rule.action() {
            Action::Single(kind) => self.push_token(*kind, span),
            Action::Delegate(handle) => self.push_delegation(handle, span),
            Action::Groups(rules) => {
                let parts = rules.iter().enumerate().filter_map(|(index, group)| {
                    let range = groups.get(index + 1).cloned().flatten()?;
                    let part = match group {
                        GroupRule::Kind(kind) => Part::Kind(*kind),
                        GroupRule::Delegate(handle) => Part::Delegate(handle),
                    };
                    Some((part, range))
                });
                let segments = normalize(self.input, span, parts);
                self.push_segments(segments);
            }
            Action::Callback(callback) => {
                let table = self.set.table(self.table);
                let context = MatchContext {
                    input: self.input,
                    groups,
                    state: table.state_name(self.stack.top()),
                    stack_depth: self.stack.depth(),
                };
                let parts = callback
                    .call(&context)
                    .into_iter()
                    .map(|(kind, range)| (Part::Kind(kind), range));
                let segments = normalize(self.input, span, parts);
                self.push_segments(segments);
            }
        }
    }

    fn push_segments(&mut self, segments: Vec<Segment<Part<'a>>>) {
        for segment in segments {
            match segment {
                Segment::Claimed(Part::Kind(kind), range) => self.push_token(kind, range),
                Segment::Claimed(Part::Delegate(handle), range) => {
                    self.push_delegation(handle, range)
                }
                Segment::Unclaimed(range) => self.push_error_chars(range),
            }
        }
    }

    fn push_token(&mut self, kind: TokenKind, range: Range<usize>) {
        let input = self.input;
        let token = Token::new(kind, self.base + range.start, &input[range]);
        self.pending.push_back(Pending::Token(token));
    }

    fn push_delegation(&mut self, handle: &'a LexerHandle, range: Range<usize>) {
        let max_depth = self.set.options().max_delegation_depth;
        if self.depth >= max_depth {
            warn!(
                table = self.table().name(),
                lexer = %handle.target(),
                depth = self.depth,
                "delegation nested too deep, emitting span as errors"
            );
            self.push_error_chars(range);
            return;
        }

        let Some(resolved) = handle.resolve(self.set, self.table) else {
            self.push_error_chars(range);
            return;
        };

        let input = self.input;
        let nested = TokenStream::nested(
            self.set,
            resolved.table,
            &input[range.clone()],
            self.base + range.start,
            self.depth + 1,
            resolved.state,
        );
        self.pending.push_back(Pending::Nested(Box::new(nested)));
    }

    fn push_error_chars(&mut self, range: Range<usize>) {
        let input = self.input;
        for (offset, ch) in input[range.clone()].char_indices() {
            let start = range.start + offset;
            self.push_token(TokenKind::Error, start..start + ch.len_utf8());
        }
    }

    /// Emit the character at the cursor as an error and step over it
    fn push_error_char(&mut self) {
        let width = self.input[self.cursor..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        if width == 0 {
            return;
        }
        self.push_token(TokenKind::Error, self.cursor..self.cursor + width);
        self.cursor += width;
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            match self.pending.pop_front() {
                Some(Pending::Token(token)) => return Some(token),
                Some(Pending::Nested(mut nested)) => {
                    if let Some(token) = nested.next() {
                        self.pending.push_front(Pending::Nested(nested));
                        return Some(token);
                    }
                }
                None => {
                    if self.cursor >= self.input.len() {
                        return None;
                    }
                    self.step();
                }
            }
        }
    }
}

impl FusedIterator for TokenStream<'_> {}

impl std::fmt::Debug for TokenStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStream")
            .field("table", &self.table().name())
            .field("offset", &self.offset())
            .field("depth", &self.depth)
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}
