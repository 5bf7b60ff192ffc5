//! Construction errors
//!
//! Tokenizing never fails: input the grammar does not cover becomes `Error`
//! tokens. The only failures are malformed grammars, reported when a table set
//! is built and before any input is scanned.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("grammar '{grammar}' has no 'root' state")]
    MissingRoot { grammar: String },

    #[error("grammar '{grammar}': state '{from}' refers to unknown state '{state}'")]
    UnknownState {
        grammar: String,
        from: String,
        state: String,
    },

    #[error("grammar '{grammar}': include cycle {}", .cycle.join(" -> "))]
    IncludeCycle { grammar: String, cycle: Vec<String> },

    #[error("grammar '{grammar}', state '{state}': invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        grammar: String,
        state: String,
        pattern: String,
        message: String,
    },

    #[error(
        "grammar '{grammar}', state '{state}': pattern '{pattern}' can match the empty string but has no transition"
    )]
    EmptyMatchWithoutTransition {
        grammar: String,
        state: String,
        pattern: String,
    },

    #[error("grammar '{grammar}', state '{state}': '#pop:0' in rule '{pattern}'")]
    ZeroPop {
        grammar: String,
        state: String,
        pattern: String,
    },

    #[error(
        "grammar '{grammar}', state '{state}': rule '{pattern}' assigns {actions} groups but the pattern has {groups}"
    )]
    GroupCountMismatch {
        grammar: String,
        state: String,
        pattern: String,
        actions: usize,
        groups: usize,
    },

    #[error("grammar '{grammar}' delegates to unknown lexer '{target}'")]
    UnknownLexer { grammar: String, target: String },

    #[error("grammar '{grammar}' delegates to state '{state}' which lexer '{target}' does not define")]
    UnknownDelegationState {
        grammar: String,
        target: String,
        state: String,
    },

    #[error("lexer name or alias '{name}' is defined twice")]
    DuplicateLexer { name: String },
}
