//! Compiled state tables
//!
//! A [`StateTable`] is the validated, executable form of a [`Grammar`]:
//!
//! - every pattern is compiled with the grammar's flags
//! - every `include` is spliced in, leaving one flat rule list per state
//! - every state named by a transition is resolved to a [`StateId`]
//!
//! Tables are immutable once built and can be shared across threads.
//!
//! [`Grammar`]: crate::grammar::Grammar

mod compile;
pub mod pattern;
pub mod set;

pub(crate) use compile::compile_grammar;
pub use pattern::Pattern;
pub use set::{LexerHandle, TableId, TableSet, TableSetBuilder};

use crate::grammar::{Callback, Delegation, MatchFlags};
use crate::token::TokenKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Index of a state inside one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

/// A resolved stack operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Push(StateId),
    PushCurrent,
    Pop(usize),
}

/// What a compiled rule emits
#[derive(Debug)]
pub enum Action {
    Single(TokenKind),
    Groups(Vec<GroupRule>),
    Delegate(LexerHandle),
    Callback(Callback),
}

#[derive(Debug)]
pub enum GroupRule {
    Kind(TokenKind),
    Delegate(LexerHandle),
}

/// One executable rule
#[derive(Debug)]
pub struct Rule {
    pattern: Pattern,
    action: Action,
    ops: Vec<Op>,
    /// State the rule was declared in (differs from the running state when included)
    origin: StateId,
}

impl Rule {
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn origin(&self) -> StateId {
        self.origin
    }

    /// Whether applying the action needs capture group spans
    pub fn needs_groups(&self) -> bool {
        matches!(self.action, Action::Groups(_) | Action::Callback(_))
    }
}

#[derive(Debug)]
pub struct State {
    name: String,
    rules: Vec<Arc<Rule>>,
}

impl State {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }
}

/// A validated grammar, ready to drive the engine
#[derive(Debug)]
pub struct StateTable {
    name: String,
    aliases: Vec<String>,
    flags: MatchFlags,
    states: Vec<State>,
    index: HashMap<String, StateId>,
    root: StateId,
    /// Delegations declared anywhere in the table, checked against the set
    delegations: Vec<Delegation>,
}

impl StateTable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn flags(&self) -> MatchFlags {
        self.flags
    }

    pub fn root(&self) -> StateId {
        self.root
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub fn state_name(&self, id: StateId) -> &str {
        &self.states[id.0].name
    }

    /// The flat, include-resolved rule list of a state
    pub fn rules(&self, id: StateId) -> &[Arc<Rule>] {
        &self.states[id.0].rules
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states
            .iter()
            .enumerate()
            .map(|(index, state)| (StateId(index), state))
    }

    pub(crate) fn delegations(&self) -> &[Delegation] {
        &self.delegations
    }
}
