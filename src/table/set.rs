//! Sets of tables that may delegate to each other
//!
//! Delegation names its target lexer by name, so a table alone is not enough
//! to scan: the engine always runs against a [`TableSet`]. Building the set
//! compiles every grammar and checks that every delegation target exists.

use super::{compile_grammar, StateId, StateTable};
use crate::config::EngineOptions;
use crate::engine::TokenStream;
use crate::error::BuildError;
use crate::grammar::{Delegation, Grammar, LexerRef};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Index of a table inside its set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub(crate) table: TableId,
    pub(crate) state: Option<StateId>,
}

/// A delegation target, resolved on first use
///
/// `this` means the table the rule belongs to, which is only known once a scan
/// runs the rule. The result is cached for the lifetime of the set.
#[derive(Debug)]
pub struct LexerHandle {
    target: LexerRef,
    state: Option<String>,
    resolved: OnceCell<Option<Resolved>>,
}

impl LexerHandle {
    pub(crate) fn new(delegation: &Delegation) -> Self {
        LexerHandle {
            target: delegation.target.clone(),
            state: delegation.state.clone(),
            resolved: OnceCell::new(),
        }
    }

    pub fn target(&self) -> &LexerRef {
        &self.target
    }

    pub fn start_state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub(crate) fn resolve(&self, set: &TableSet, current: TableId) -> Option<Resolved> {
        *self.resolved.get_or_init(|| {
            let resolved = self.lookup(set, current);
            if resolved.is_none() {
                warn!(lexer = %self.target, state = ?self.state, "unresolvable delegation");
            }
            resolved
        })
    }

    fn lookup(&self, set: &TableSet, current: TableId) -> Option<Resolved> {
        let table = match &self.target {
            LexerRef::This => current,
            LexerRef::Named(name) => set.id(name)?,
        };
        let state = match &self.state {
            Some(name) => Some(set.table(table).state_id(name)?),
            None => None,
        };
        Some(Resolved { table, state })
    }
}

/// Compiled tables plus the options every scan over them uses
#[derive(Debug)]
pub struct TableSet {
    tables: Vec<StateTable>,
    index: HashMap<String, TableId>,
    options: EngineOptions,
}

impl TableSet {
    pub fn builder() -> TableSetBuilder {
        TableSetBuilder::new()
    }

    /// Look a table up by name or alias
    pub fn id(&self, name: &str) -> Option<TableId> {
        self.index.get(name).copied()
    }

    pub fn table(&self, id: TableId) -> &StateTable {
        &self.tables[id.0]
    }

    pub fn get(&self, name: &str) -> Option<&StateTable> {
        self.id(name).map(|id| self.table(id))
    }

    pub fn tables(&self) -> impl Iterator<Item = (TableId, &StateTable)> {
        self.tables
            .iter()
            .enumerate()
            .map(|(index, table)| (TableId(index), table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Start a lazy scan of `text` with table `id`
    pub fn tokenize<'a>(&'a self, id: TableId, text: &'a str) -> TokenStream<'a> {
        TokenStream::new(self, id, text)
    }

    pub fn tokenize_named<'a>(&'a self, name: &str, text: &'a str) -> Option<TokenStream<'a>> {
        self.id(name).map(|id| self.tokenize(id, text))
    }
}

/// Collects grammars and compiles them into a [`TableSet`]
#[derive(Debug, Default)]
pub struct TableSetBuilder {
    grammars: Vec<Grammar>,
    options: EngineOptions,
}

impl TableSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grammar(mut self, grammar: Grammar) -> Self {
        self.grammars.push(grammar);
        self
    }

    pub fn grammars<I>(mut self, grammars: I) -> Self
    where
        I: IntoIterator<Item = Grammar>,
    {
        self.grammars.extend(grammars);
        self
    }

    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<TableSet, BuildError> {
        let mut index = HashMap::new();
        for (position, grammar) in self.grammars.iter().enumerate() {
            for name in std::iter::once(&grammar.name).chain(&grammar.aliases) {
                if index.insert(name.clone(), TableId(position)).is_some() {
                    return Err(BuildError::DuplicateLexer { name: name.clone() });
                }
            }
        }

        let tables = self
            .grammars
            .iter()
            .map(compile_grammar)
            .collect::<Result<Vec<_>, _>>()?;

        let set = TableSet {
            tables,
            index,
            options: self.options,
        };
        for (_, table) in set.tables() {
            validate_delegations(&set, table)?;
        }

        debug!(tables = set.len(), "built table set");
        Ok(set)
    }
}

fn validate_delegations(set: &TableSet, table: &StateTable) -> Result<(), BuildError> {
    for delegation in table.delegations() {
        let target = match &delegation.target {
            LexerRef::This => table,
            LexerRef::Named(name) => set.get(name).ok_or_else(|| BuildError::UnknownLexer {
                grammar: table.name().to_string(),
                target: name.clone(),
            })?,
        };

        if let Some(state) = &delegation.state {
            if target.state_id(state).is_none() {
                return Err(BuildError::UnknownDelegationState {
                    grammar: table.name().to_string(),
                    target: target.name().to_string(),
                    state: state.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{rule, using, using_state};
    use crate::token::TokenKind;

    fn leaf(name: &str) -> Grammar {
        Grammar::new(name).state("root", [rule(r"\w+", TokenKind::Name)])
    }

    #[test]
    fn looks_up_by_name_and_alias() {
        let set = TableSet::builder()
            .grammar(leaf("shell").alias("sh").alias("bash"))
            .grammar(leaf("sql"))
            .build()
            .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.id("sh"), set.id("shell"));
        assert_eq!(set.get("bash").map(StateTable::name), Some("shell"));
        assert_ne!(set.id("sql"), set.id("shell"));
        assert!(set.id("python").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let error = TableSet::builder()
            .grammar(leaf("a").alias("x"))
            .grammar(leaf("x"))
            .build()
            .unwrap_err();
        assert_eq!(error, BuildError::DuplicateLexer { name: "x".into() });
    }

    #[test]
    fn unknown_delegation_target_is_rejected() {
        let error = TableSet::builder()
            .grammar(Grammar::new("host").state("root", [rule(".+", using("guest"))]))
            .build()
            .unwrap_err();
        assert_eq!(
            error,
            BuildError::UnknownLexer {
                grammar: "host".into(),
                target: "guest".into(),
            }
        );
    }

    #[test]
    fn unknown_delegation_state_is_rejected() {
        let error = TableSet::builder()
            .grammar(Grammar::new("host").state("root", [rule(".+", using_state("guest", "nope"))]))
            .grammar(leaf("guest"))
            .build()
            .unwrap_err();
        assert!(matches!(
            error,
            BuildError::UnknownDelegationState { state, .. } if state == "nope"
        ));
    }

    #[test]
    fn handles_resolve_once_against_the_set() {
        let set = TableSet::builder()
            .grammar(leaf("host"))
            .grammar(
                Grammar::new("guest")
                    .state("root", [rule("x", TokenKind::Text)])
                    .state("inner", [rule("y", TokenKind::Text)]),
            )
            .build()
            .unwrap();
        let host = set.id("host").unwrap();
        let guest = set.id("guest").unwrap();

        let named = LexerHandle::new(&using_state("guest", "inner"));
        let resolved = named.resolve(&set, host).unwrap();
        assert_eq!(resolved.table, guest);
        assert_eq!(resolved.state, set.table(guest).state_id("inner"));
        assert_eq!(named.resolve(&set, host), Some(resolved));

        let this = LexerHandle::new(&using("this"));
        assert_eq!(this.resolve(&set, host).map(|r| r.table), Some(host));

        let missing = LexerHandle::new(&using("python"));
        assert_eq!(missing.resolve(&set, host), None);
    }
}
