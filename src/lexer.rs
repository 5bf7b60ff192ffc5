//! Single-language convenience wrapper
//!
//! Most callers want one lexer and do not care about table sets. [`Lexer`]
//! owns a set holding the lexer's grammar plus anything it delegates to, and
//! remembers which table is the entry point.

use crate::config::EngineOptions;
use crate::engine::TokenStream;
use crate::error::BuildError;
use crate::grammar::Grammar;
use crate::table::{StateTable, TableId, TableSet};

#[derive(Debug)]
pub struct Lexer {
    set: TableSet,
    id: TableId,
}

impl Lexer {
    /// Compile a self-contained grammar
    pub fn new(grammar: Grammar) -> Result<Self, BuildError> {
        Self::with_dependencies(grammar, Vec::new())
    }

    /// Compile `grammar` together with the grammars it delegates to
    pub fn with_dependencies<I>(grammar: Grammar, dependencies: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Grammar>,
    {
        Self::with_options(grammar, dependencies, EngineOptions::default())
    }

    pub fn with_options<I>(
        grammar: Grammar,
        dependencies: I,
        options: EngineOptions,
    ) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Grammar>,
    {
        let name = grammar.name.clone();
        let set = TableSet::builder()
            .grammar(grammar)
            .grammars(dependencies)
            .options(options)
            .build()?;
        // The primary grammar is always the first table of the set
        let id = set.id(&name).unwrap_or(TableId(0));
        Ok(Lexer { set, id })
    }

    /// Use table `name` of an existing set as the entry point
    pub fn from_set(set: TableSet, name: &str) -> Option<Self> {
        let id = set.id(name)?;
        Some(Lexer { set, id })
    }

    pub fn tokenize<'a>(&'a self, text: &'a str) -> TokenStream<'a> {
        self.set.tokenize(self.id, text)
    }

    pub fn name(&self) -> &str {
        self.table().name()
    }

    pub fn table(&self) -> &StateTable {
        self.set.table(self.id)
    }

    pub fn set(&self) -> &TableSet {
        &self.set
    }
}
