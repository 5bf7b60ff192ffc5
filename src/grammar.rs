//! Declarative lexer definitions
//!
//! A [`Grammar`] is pure data: a map from state name to an ordered list of
//! entries. The engine gives it meaning:
//!
//! 1. Rules of the state on top of the stack are tried in declaration order
//! 2. The first rule whose pattern matches at the cursor wins
//! 3. Its action classifies the matched text, its transition updates the stack
//!
//! Order is part of the contract. A rule for `--` must come before a rule for
//! `-`, otherwise `--` is never seen.
//!
//! Grammars are built in code with the helpers of this module, or read from
//! YAML/JSON files (see [`crate::loader`]):
//!
//! ```text
//! name: brainfuck
//! states:
//!   root:
//!     - match: '\['
//!       token: Keyword
//!       next: loop
//!     - include: common
//!   loop:
//!     - match: '\]'
//!       token: Keyword
//!       next: '#pop'
//!     - include: common
//! ```

pub mod flags;
mod raw;
pub mod transition;

pub use flags::MatchFlags;
pub use raw::EntryError;
pub use transition::{StackOp, Transition, TransitionError};

use crate::engine::MatchContext;
use crate::token::TokenKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Every grammar must define this state; scanning starts in it
pub const ROOT_STATE: &str = "root";

/// A complete lexer definition
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grammar {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub flags: MatchFlags,
    pub states: BTreeMap<String, Vec<Entry>>,
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Grammar {
            name: name.into(),
            aliases: Vec::new(),
            flags: MatchFlags::default(),
            states: BTreeMap::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn flags(mut self, flags: MatchFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Define (or replace) a state
    pub fn state<I>(mut self, name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        self.states.insert(name.into(), entries.into_iter().collect());
        self
    }
}

/// One element of a state's rule list
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "raw::RawEntry")]
pub enum Entry {
    Rule(RuleDef),
    /// Splice the rules of another state of the same grammar here
    Include(String),
    /// Zero-width rule that only changes the stack
    Default(Transition),
}

/// A pattern, what to emit for it, and where to go next
#[derive(Debug, Clone)]
pub struct RuleDef {
    pub pattern: String,
    pub action: ActionDef,
    pub transition: Transition,
}

/// How the text of a match becomes tokens
#[derive(Debug, Clone)]
pub enum ActionDef {
    /// The whole match is one token
    Token(TokenKind),
    /// One token per capture group, in group order
    Groups(Vec<GroupAction>),
    /// The whole match is tokenized by a nested, independent scan
    Using(Delegation),
    /// Tokens computed from the match by user code
    Callback(Callback),
}

impl From<TokenKind> for ActionDef {
    fn from(kind: TokenKind) -> Self {
        ActionDef::Token(kind)
    }
}

impl From<Delegation> for ActionDef {
    fn from(delegation: Delegation) -> Self {
        ActionDef::Using(delegation)
    }
}

impl From<Callback> for ActionDef {
    fn from(callback: Callback) -> Self {
        ActionDef::Callback(callback)
    }
}

/// What one capture group of a group-splitting rule becomes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GroupAction {
    Kind(TokenKind),
    Using(Delegation),
}

impl From<TokenKind> for GroupAction {
    fn from(kind: TokenKind) -> Self {
        GroupAction::Kind(kind)
    }
}

impl From<Delegation> for GroupAction {
    fn from(delegation: Delegation) -> Self {
        GroupAction::Using(delegation)
    }
}

/// Hand a matched span to another (or the same) lexer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Delegation {
    #[serde(rename = "using")]
    pub target: LexerRef,
    /// State pushed on top of `root` before the nested scan starts
    #[serde(default)]
    pub state: Option<String>,
}

/// Names the lexer a delegation runs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum LexerRef {
    /// The grammar the rule belongs to
    This,
    /// Another grammar of the same table set, by name or alias
    Named(String),
}

impl LexerRef {
    pub fn named(name: impl Into<String>) -> Self {
        LexerRef::Named(name.into())
    }
}

impl From<String> for LexerRef {
    fn from(name: String) -> Self {
        if name == "this" {
            LexerRef::This
        } else {
            LexerRef::Named(name)
        }
    }
}

impl From<&str> for LexerRef {
    fn from(name: &str) -> Self {
        LexerRef::from(name.to_string())
    }
}

impl fmt::Display for LexerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerRef::This => f.write_str("this"),
            LexerRef::Named(name) => f.write_str(name),
        }
    }
}

type CallbackFn = dyn Fn(&MatchContext<'_>) -> Vec<(TokenKind, Range<usize>)> + Send + Sync;

/// User code computing tokens from a match
///
/// The callback returns `(kind, range)` pairs with ranges in the same
/// coordinates as [`MatchContext::range`]. Pairs should be ordered and lie
/// inside the match; the engine clips overlaps and reports any byte of the
/// match the callback did not claim as [`TokenKind::Error`].
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&MatchContext<'_>) -> Vec<(TokenKind, Range<usize>)> + Send + Sync + 'static,
    {
        Callback(Arc::new(f))
    }

    pub fn call(&self, context: &MatchContext<'_>) -> Vec<(TokenKind, Range<usize>)> {
        (self.0)(context)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// A rule emitting the whole match as one token
pub fn rule(pattern: impl Into<String>, action: impl Into<ActionDef>) -> Entry {
    rule_then(pattern, action, Transition::none())
}

/// A rule with a stack transition
pub fn rule_then(
    pattern: impl Into<String>,
    action: impl Into<ActionDef>,
    next: Transition,
) -> Entry {
    Entry::Rule(RuleDef {
        pattern: pattern.into(),
        action: action.into(),
        transition: next,
    })
}

pub fn include(state: impl Into<String>) -> Entry {
    Entry::Include(state.into())
}

/// A zero-width rule that only applies `next`
pub fn default(next: Transition) -> Entry {
    Entry::Default(next)
}

pub fn bygroups<I, G>(groups: I) -> ActionDef
where
    I: IntoIterator<Item = G>,
    G: Into<GroupAction>,
{
    ActionDef::Groups(groups.into_iter().map(Into::into).collect())
}

/// Delegate to `target`, starting its scan fresh in `root`
pub fn using(target: impl Into<LexerRef>) -> Delegation {
    Delegation {
        target: target.into(),
        state: None,
    }
}

/// Delegate to `target`, starting its scan in `state` (above `root`)
pub fn using_state(target: impl Into<LexerRef>, state: impl Into<String>) -> Delegation {
    Delegation {
        target: target.into(),
        state: Some(state.into()),
    }
}

pub fn callback<F>(f: F) -> ActionDef
where
    F: Fn(&MatchContext<'_>) -> Vec<(TokenKind, Range<usize>)> + Send + Sync + 'static,
{
    ActionDef::Callback(Callback::new(f))
}

/// Build an alternation matching any of `words` literally
///
/// Longer words are tried first, so under first-match semantics `int` is not
/// cut short by `in`. The result is `prefix(?:w1|w2|...)suffix`.
pub fn words<I, S>(words: I, prefix: &str, suffix: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut list: Vec<String> = words
        .into_iter()
        .map(|word| word.as_ref().to_string())
        .collect();
    list.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    list.dedup();

    let escaped: Vec<String> = list.iter().map(|word| regex::escape(word)).collect();
    format!("{prefix}(?:{}){suffix}", escaped.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_escapes_and_orders_longest_first() {
        let pattern = words(["in", "int", "a.b", "in"], r"\b", r"\b");
        assert_eq!(pattern, r"\b(?:a\.b|int|in)\b");
    }

    #[test]
    fn builder_collects_states() {
        let grammar = Grammar::new("demo")
            .alias("dm")
            .flags(MatchFlags::new().case_insensitive(true))
            .state(
                ROOT_STATE,
                [
                    rule(r"\s+", TokenKind::Text),
                    rule_then("/\\*", TokenKind::CommentMultiline, Transition::push("comment")),
                    include("common"),
                ],
            )
            .state("common", [rule(r"\w+", TokenKind::Name)])
            .state("comment", [default(Transition::pop())]);

        assert_eq!(grammar.aliases, vec!["dm".to_string()]);
        assert!(grammar.flags.case_insensitive);
        assert_eq!(grammar.states.len(), 3);
        assert_eq!(grammar.states[ROOT_STATE].len(), 3);
    }

    #[test]
    fn lexer_ref_reads_this() {
        assert_eq!(LexerRef::from("this"), LexerRef::This);
        assert_eq!(LexerRef::from("sql"), LexerRef::named("sql"));
        assert_eq!(using("this").target.to_string(), "this");
    }
}
