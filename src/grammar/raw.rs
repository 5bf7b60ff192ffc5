//! File representation of grammar entries
//!
//! In YAML/JSON an entry is a flat map. Exactly one of `match`, `include` or
//! `default` selects its form; a `match` entry needs exactly one of `token`,
//! `groups` or `using`.

use super::{ActionDef, Delegation, Entry, GroupAction, LexerRef, RuleDef, Transition};
use crate::token::TokenKind;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry needs one of `match`, `include` or `default`")]
    Empty,
    #[error("entry mixes `match`, `include` and `default`")]
    Ambiguous,
    #[error("rule '{0}' needs one of `token`, `groups` or `using`")]
    MissingAction(String),
    #[error("rule '{0}' has more than one of `token`, `groups` and `using`")]
    ConflictingActions(String),
    #[error("`{field}` is not allowed on {form} entries")]
    StrayField {
        field: &'static str,
        form: &'static str,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEntry {
    include: Option<String>,
    default: Option<Transition>,
    #[serde(rename = "match")]
    pattern: Option<String>,
    token: Option<TokenKind>,
    groups: Option<Vec<GroupAction>>,
    using: Option<LexerRef>,
    state: Option<String>,
    next: Option<Transition>,
}

impl RawEntry {
    fn has_action_fields(&self) -> Option<&'static str> {
        if self.token.is_some() {
            Some("token")
        } else if self.groups.is_some() {
            Some("groups")
        } else if self.using.is_some() {
            Some("using")
        } else if self.state.is_some() {
            Some("state")
        } else if self.next.is_some() {
            Some("next")
        } else {
            None
        }
    }
}

impl TryFrom<RawEntry> for Entry {
    type Error = EntryError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let forms = [
            raw.include.is_some(),
            raw.default.is_some(),
            raw.pattern.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        match forms {
            0 => return Err(EntryError::Empty),
            1 => {}
            _ => return Err(EntryError::Ambiguous),
        }

        if let Some(state) = raw.include.clone() {
            if let Some(field) = raw.has_action_fields() {
                return Err(EntryError::StrayField {
                    field,
                    form: "include",
                });
            }
            return Ok(Entry::Include(state));
        }

        if let Some(transition) = raw.default.clone() {
            if let Some(field) = raw.has_action_fields() {
                return Err(EntryError::StrayField {
                    field,
                    form: "default",
                });
            }
            return Ok(Entry::Default(transition));
        }

        let RawEntry {
            pattern,
            token,
            groups,
            using,
            state,
            next,
            ..
        } = raw;
        let pattern = pattern.unwrap_or_default();

        let action = match (token, groups, using) {
            (Some(kind), None, None) => ActionDef::Token(kind),
            (None, Some(groups), None) => ActionDef::Groups(groups),
            (None, None, Some(target)) => ActionDef::Using(Delegation {
                target,
                state: state.clone(),
            }),
            (None, None, None) => return Err(EntryError::MissingAction(pattern)),
            _ => return Err(EntryError::ConflictingActions(pattern)),
        };

        if state.is_some() && !matches!(action, ActionDef::Using(_)) {
            return Err(EntryError::StrayField {
                field: "state",
                form: "non-delegating rule",
            });
        }

        Ok(Entry::Rule(RuleDef {
            pattern,
            action,
            transition: next.unwrap_or_default(),
        }))
    }
}
