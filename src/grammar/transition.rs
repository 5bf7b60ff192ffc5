//! State stack transitions attached to rules
//!
//! A transition is an ordered list of stack operations applied after a rule
//! matched. The conventional text notation is accepted wherever a transition is
//! read from a grammar file:
//!
//! - `"#pop"` removes the top state, `"#pop:N"` removes N states
//! - `"#push"` pushes the current state again
//! - any other string pushes the state of that name
//!
//! A list of such strings is applied left to right, so `["#pop", "value"]`
//! replaces the top of the stack.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single stack operation, with state names not yet resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackOp {
    /// Push the named state
    Push(String),
    /// Push the state currently on top of the stack
    PushCurrent,
    /// Remove this many frames; the bottom frame is never removed
    Pop(usize),
}

/// Errors while reading transition notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("empty state name in transition")]
    Empty,
    #[error("invalid pop count in '{0}'")]
    InvalidPopCount(String),
    #[error("'#pop:0' does not change the stack")]
    ZeroPop,
    #[error("unknown transition directive '{0}'")]
    UnknownDirective(String),
}

impl FromStr for StackOp {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TransitionError::Empty);
        }
        if s == "#push" {
            return Ok(StackOp::PushCurrent);
        }
        if s == "#pop" {
            return Ok(StackOp::Pop(1));
        }
        if let Some(count) = s.strip_prefix("#pop:") {
            let count: usize = count
                .parse()
                .map_err(|_| TransitionError::InvalidPopCount(s.to_string()))?;
            if count == 0 {
                return Err(TransitionError::ZeroPop);
            }
            return Ok(StackOp::Pop(count));
        }
        if s.starts_with('#') {
            return Err(TransitionError::UnknownDirective(s.to_string()));
        }
        Ok(StackOp::Push(s.to_string()))
    }
}

impl fmt::Display for StackOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackOp::Push(state) => f.write_str(state),
            StackOp::PushCurrent => f.write_str("#push"),
            StackOp::Pop(1) => f.write_str("#pop"),
            StackOp::Pop(count) => write!(f, "#pop:{count}"),
        }
    }
}

/// What a rule does to the state stack after it matched
///
/// The empty transition leaves the stack alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTransition")]
pub struct Transition {
    ops: Vec<StackOp>,
}

impl Transition {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn push(state: impl Into<String>) -> Self {
        Transition {
            ops: vec![StackOp::Push(state.into())],
        }
    }

    /// Push several states; the last one ends up on top
    pub fn push_all<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Transition {
            ops: states
                .into_iter()
                .map(|state| StackOp::Push(state.into()))
                .collect(),
        }
    }

    pub fn push_current() -> Self {
        Transition {
            ops: vec![StackOp::PushCurrent],
        }
    }

    pub fn pop() -> Self {
        Self::pop_n(1)
    }

    pub fn pop_n(count: usize) -> Self {
        Transition {
            ops: vec![StackOp::Pop(count)],
        }
    }

    /// Pop `count` frames, then push `states` in order
    pub fn pop_push<I, S>(count: usize, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut transition = Self::pop_n(count);
        transition
            .ops
            .extend(states.into_iter().map(|state| StackOp::Push(state.into())));
        transition
    }

    /// Append one more operation
    pub fn then(mut self, op: StackOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Read a sequence written in the text notation, e.g. `["#pop", "value"]`
    pub fn parse_sequence<I, S>(items: I) -> Result<Self, TransitionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ops = items
            .into_iter()
            .map(|item| item.as_ref().parse())
            .collect::<Result<Vec<StackOp>, _>>()?;
        Ok(Transition { ops })
    }

    pub fn ops(&self) -> &[StackOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl FromStr for Transition {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Transition {
            ops: vec![s.parse()?],
        })
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops: Vec<String> = self.ops.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", ops.join(", "))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTransition {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<RawTransition> for Transition {
    type Error = TransitionError;

    fn try_from(raw: RawTransition) -> Result<Self, Self::Error> {
        match raw {
            RawTransition::One(item) => item.parse(),
            RawTransition::Many(items) => Transition::parse_sequence(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#pop", StackOp::Pop(1))]
    #[case("#pop:3", StackOp::Pop(3))]
    #[case("#push", StackOp::PushCurrent)]
    #[case("multiline-comments", StackOp::Push("multiline-comments".into()))]
    fn parses_notation(#[case] input: &str, #[case] expected: StackOp) {
        assert_eq!(input.parse::<StackOp>(), Ok(expected));
    }

    #[rstest]
    #[case("", TransitionError::Empty)]
    #[case("#pop:0", TransitionError::ZeroPop)]
    #[case("#pop:x", TransitionError::InvalidPopCount("#pop:x".into()))]
    #[case("#jump", TransitionError::UnknownDirective("#jump".into()))]
    fn rejects_bad_notation(#[case] input: &str, #[case] expected: TransitionError) {
        assert_eq!(input.parse::<StackOp>(), Err(expected));
    }

    #[test]
    fn pop_push_pops_first() {
        let transition = Transition::pop_push(2, ["a", "b"]);
        assert_eq!(
            transition.ops(),
            &[
                StackOp::Pop(2),
                StackOp::Push("a".into()),
                StackOp::Push("b".into())
            ]
        );
        assert_eq!(transition.to_string(), "[#pop:2, a, b]");
    }

    #[test]
    fn sequence_matches_builders() {
        let parsed = Transition::parse_sequence(["#pop", "value"]).unwrap();
        assert_eq!(parsed, Transition::pop_push(1, ["value"]));
        assert!(Transition::none().is_empty());
    }

    #[test]
    fn deserializes_string_or_list() {
        let one: Transition = serde_yaml::from_str("'#pop'").unwrap();
        assert_eq!(one, Transition::pop());

        let many: Transition = serde_yaml::from_str("[loop, '#push']").unwrap();
        assert_eq!(many, Transition::push("loop").then(StackOp::PushCurrent));

        assert!(serde_yaml::from_str::<Transition>("'#pop:0'").is_err());
    }
}
