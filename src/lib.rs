//! # statelex
//!
//! A state-machine driven regular-expression tokenizer.
//!
//! A lexer is described as data, a [`Grammar`]: named states, each an ordered
//! list of rules. A rule pairs an anchored pattern with an action (what the
//! matched text becomes) and a transition (how the state stack changes). The
//! engine walks the input, always trying the rules of the state on top of the
//! stack, first match wins.
//!
//! ```text
//! Grammar --compile--> StateTable --(in a TableSet)--> TokenStream --> Token*
//! ```
//!
//! - [`token`]: the token kind hierarchy and tokens
//! - [`grammar`]: declarative lexer definitions and their builders
//! - [`table`]: compilation, validation, and sets of tables that delegate to each other
//! - [`engine`]: the lazy scanner
//! - [`loader`]: YAML/JSON grammar files
//! - [`testing`]: stream invariant checks for grammar tests
//!
//! Scanning never fails. Text no rule accounts for comes out as
//! [`TokenKind::Error`] tokens and the scan carries on, so the tokens of a
//! stream always concatenate back to the input. Only building a table can fail,
//! with a [`BuildError`].

pub mod config;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod loader;
pub mod table;
pub mod testing;
pub mod token;

pub use config::EngineOptions;
pub use engine::{tokenize, MatchContext, StateStack, TokenStream};
pub use error::BuildError;
pub use grammar::{Grammar, MatchFlags, Transition};
pub use lexer::Lexer;
pub use table::{StateTable, TableId, TableSet, TableSetBuilder};
pub use token::{Token, TokenKind};
