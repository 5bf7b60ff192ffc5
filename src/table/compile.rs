//! Grammar to table compilation
//!
//! Runs once per grammar, when a table set is built:
//! 1. Check that `root` exists and give every state an id
//! 2. Compile each declared rule once, resolving its transition
//! 3. Splice includes depth-first, rejecting cycles
//!
//! Included rules are shared (`Arc`), not recompiled.

use super::{Action, GroupRule, LexerHandle, Op, Pattern, Rule, State, StateId, StateTable};
use crate::error::BuildError;
use crate::grammar::{
    ActionDef, Delegation, Entry, GroupAction, Grammar, RuleDef, StackOp, Transition, ROOT_STATE,
};
use crate::token::TokenKind;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

enum Slot {
    Rule(Arc<Rule>),
    Include(StateId),
}

pub(crate) fn compile_grammar(grammar: &Grammar) -> Result<StateTable, BuildError> {
    let index: HashMap<String, StateId> = grammar
        .states
        .keys()
        .enumerate()
        .map(|(position, name)| (name.clone(), StateId(position)))
        .collect();
    let names: Vec<String> = grammar.states.keys().cloned().collect();

    let root = *index.get(ROOT_STATE).ok_or_else(|| BuildError::MissingRoot {
        grammar: grammar.name.clone(),
    })?;

    let compiler = RuleCompiler {
        grammar,
        index: &index,
    };

    let mut declared = Vec::with_capacity(names.len());
    let mut delegations = Vec::new();
    for (position, (state, entries)) in grammar.states.iter().enumerate() {
        let mut slots = Vec::with_capacity(entries.len());
        for entry in entries {
            let slot = match entry {
                Entry::Rule(def) => {
                    collect_delegations(def, &mut delegations);
                    Slot::Rule(Arc::new(compiler.compile(state, StateId(position), def)?))
                }
                Entry::Default(transition) => Slot::Rule(Arc::new(compiler.compile_default(
                    state,
                    StateId(position),
                    transition,
                )?)),
                Entry::Include(target) => Slot::Include(compiler.state_id(state, target)?),
            };
            slots.push(slot);
        }
        declared.push(slots);
    }

    let mut resolver = IncludeResolver {
        grammar: &grammar.name,
        names: &names,
        declared: &declared,
        resolved: vec![None; names.len()],
        visiting: Vec::new(),
    };
    let mut states = Vec::with_capacity(names.len());
    for (position, name) in names.iter().enumerate() {
        states.push(State {
            name: name.clone(),
            rules: resolver.resolve(StateId(position))?,
        });
    }

    debug!(
        grammar = %grammar.name,
        states = states.len(),
        rules = states.iter().map(|state| state.rules.len()).sum::<usize>(),
        "compiled state table"
    );

    Ok(StateTable {
        name: grammar.name.clone(),
        aliases: grammar.aliases.clone(),
        flags: grammar.flags,
        states,
        index,
        root,
        delegations,
    })
}

fn collect_delegations(def: &RuleDef, out: &mut Vec<Delegation>) {
    match &def.action {
        ActionDef::Using(delegation) => out.push(delegation.clone()),
        ActionDef::Groups(groups) => {
            for group in groups {
                if let GroupAction::Using(delegation) = group {
                    out.push(delegation.clone());
                }
            }
        }
        ActionDef::Token(_) | ActionDef::Callback(_) => {}
    }
}

struct RuleCompiler<'g> {
    grammar: &'g Grammar,
    index: &'g HashMap<String, StateId>,
}

impl RuleCompiler<'_> {
    fn state_id(&self, from: &str, target: &str) -> Result<StateId, BuildError> {
        self.index
            .get(target)
            .copied()
            .ok_or_else(|| BuildError::UnknownState {
                grammar: self.grammar.name.clone(),
                from: from.to_string(),
                state: target.to_string(),
            })
    }

    fn pattern(&self, state: &str, source: &str) -> Result<Pattern, BuildError> {
        Pattern::new(source, self.grammar.flags).map_err(|error| BuildError::InvalidPattern {
            grammar: self.grammar.name.clone(),
            state: state.to_string(),
            pattern: source.to_string(),
            message: error.to_string(),
        })
    }

    fn ops(&self, state: &str, pattern: &str, transition: &Transition) -> Result<Vec<Op>, BuildError> {
        transition
            .ops()
            .iter()
            .map(|op| match op {
                StackOp::Push(target) => Ok(Op::Push(self.state_id(state, target)?)),
                StackOp::PushCurrent => Ok(Op::PushCurrent),
                StackOp::Pop(0) => Err(BuildError::ZeroPop {
                    grammar: self.grammar.name.clone(),
                    state: state.to_string(),
                    pattern: pattern.to_string(),
                }),
                StackOp::Pop(count) => Ok(Op::Pop(*count)),
            })
            .collect()
    }

    fn compile(&self, state: &str, origin: StateId, def: &RuleDef) -> Result<Rule, BuildError> {
        let pattern = self.pattern(state, &def.pattern)?;
        let ops = self.ops(state, &def.pattern, &def.transition)?;

        let action = match &def.action {
            ActionDef::Token(kind) => Action::Single(*kind),
            ActionDef::Groups(groups) => {
                if groups.len() > pattern.group_count() {
                    return Err(BuildError::GroupCountMismatch {
                        grammar: self.grammar.name.clone(),
                        state: state.to_string(),
                        pattern: def.pattern.clone(),
                        actions: groups.len(),
                        groups: pattern.group_count(),
                    });
                }
                Action::Groups(
                    groups
                        .iter()
                        .map(|group| match group {
                            GroupAction::Kind(kind) => GroupRule::Kind(*kind),
                            GroupAction::Using(delegation) => {
                                GroupRule::Delegate(LexerHandle::new(delegation))
                            }
                        })
                        .collect(),
                )
            }
            ActionDef::Using(delegation) => Action::Delegate(LexerHandle::new(delegation)),
            ActionDef::Callback(callback) => Action::Callback(callback.clone()),
        };

        if ops.is_empty() && pattern.matches_empty() {
            return Err(BuildError::EmptyMatchWithoutTransition {
                grammar: self.grammar.name.clone(),
                state: state.to_string(),
                pattern: def.pattern.clone(),
            });
        }

        Ok(Rule {
            pattern,
            action,
            ops,
            origin,
        })
    }

    fn compile_default(
        &self,
        state: &str,
        origin: StateId,
        transition: &Transition,
    ) -> Result<Rule, BuildError> {
        // Zero-width, so the token kind is never emitted
        self.compile(
            state,
            origin,
            &RuleDef {
                pattern: String::new(),
                action: ActionDef::Token(TokenKind::Text),
                transition: transition.clone(),
            },
        )
    }
}

struct IncludeResolver<'a> {
    grammar: &'a str,
    names: &'a [String],
    declared: &'a [Vec<Slot>],
    resolved: Vec<Option<Vec<Arc<Rule>>>>,
    visiting: Vec<StateId>,
}

impl IncludeResolver<'_> {
    fn resolve(&mut self, id: StateId) -> Result<Vec<Arc<Rule>>, BuildError> {
        if let Some(rules) = &self.resolved[id.0] {
            return Ok(rules.clone());
        }

        if let Some(position) = self.visiting.iter().position(|visiting| *visiting == id) {
            let mut cycle: Vec<String> = self.visiting[position..]
                .iter()
                .map(|state| self.names[state.0].clone())
                .collect();
            cycle.push(self.names[id.0].clone());
            return Err(BuildError::IncludeCycle {
                grammar: self.grammar.to_string(),
                cycle,
            });
        }

        self.visiting.push(id);
        let declared = self.declared;
        let mut rules = Vec::new();
        for slot in &declared[id.0] {
            match slot {
                Slot::Rule(rule) => rules.push(Arc::clone(rule)),
                Slot::Include(target) => rules.extend(self.resolve(*target)?),
            }
        }
        self.visiting.pop();

        self.resolved[id.0] = Some(rules.clone());
        Ok(rules)
    }
}
