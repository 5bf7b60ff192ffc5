//! Table-wide matching flags
//!
//! Flags belong to a grammar, not to individual rules. They are baked into
//! every compiled pattern of the table when it is built.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchFlags {
    /// Letters match regardless of case
    pub case_insensitive: bool,
    /// `^` and `$` also match at line boundaries
    pub multiline_anchors: bool,
    /// `.` also matches `\n`
    pub dot_matches_newline: bool,
}

impl MatchFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn multiline_anchors(mut self, yes: bool) -> Self {
        self.multiline_anchors = yes;
        self
    }

    pub fn dot_matches_newline(mut self, yes: bool) -> Self {
        self.dot_matches_newline = yes;
        self
    }
}
