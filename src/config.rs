//! Engine tuning knobs
//!
//! Options bound the work a single scan may do on hostile grammars. They never
//! change what a well-formed grammar produces.
//!
//! ```text
//! max_empty_steps: 64
//! max_delegation_depth: 32
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_EMPTY_STEPS: usize = 64;
pub const DEFAULT_MAX_DELEGATION_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// Consecutive zero-width steps allowed at one position before the engine
    /// gives up on it, emits one `Error` character and moves on
    pub max_empty_steps: usize,
    /// Nesting limit for delegated scans; deeper spans become `Error` characters
    pub max_delegation_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            max_empty_steps: DEFAULT_MAX_EMPTY_STEPS,
            max_delegation_depth: DEFAULT_MAX_DELEGATION_DEPTH,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_empty_steps(mut self, steps: usize) -> Self {
        self.max_empty_steps = steps;
        self
    }

    pub fn max_delegation_depth(mut self, depth: usize) -> Self {
        self.max_delegation_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options: EngineOptions = serde_yaml::from_str("max_empty_steps: 4").unwrap();
        assert_eq!(options.max_empty_steps, 4);
        assert_eq!(options.max_delegation_depth, DEFAULT_MAX_DELEGATION_DEPTH);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_yaml::from_str::<EngineOptions>("max_steps: 4").is_err());
    }
}
