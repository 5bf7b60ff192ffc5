//! The state stack of a running scan

use crate::table::{Op, StateId};

/// Last-in-first-out list of active states
///
/// The bottom frame is fixed at construction and can never be removed, so the
/// stack is never empty. Pops that would reach below it stop at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStack {
    root: StateId,
    above: Vec<StateId>,
}

impl StateStack {
    pub fn new(root: StateId) -> Self {
        StateStack {
            root,
            above: Vec::new(),
        }
    }

    pub fn top(&self) -> StateId {
        self.above.last().copied().unwrap_or(self.root)
    }

    pub fn push(&mut self, state: StateId) {
        self.above.push(state);
    }

    /// Remove up to `count` frames, keeping the bottom one
    ///
    /// Returns how many frames were actually removed.
    pub fn pop(&mut self, count: usize) -> usize {
        let removed = count.min(self.above.len());
        self.above.truncate(self.above.len() - removed);
        removed
    }

    /// Number of frames, bottom included
    pub fn depth(&self) -> usize {
        self.above.len() + 1
    }

    /// Frames from bottom to top
    pub fn frames(&self) -> impl Iterator<Item = StateId> + '_ {
        std::iter::once(self.root).chain(self.above.iter().copied())
    }

    /// Apply a rule's operations in order
    ///
    /// Returns false when a pop was clamped at the bottom frame.
    pub fn apply(&mut self, ops: &[Op]) -> bool {
        let mut exact = true;
        for op in ops {
            match *op {
                Op::Push(state) => self.push(state),
                Op::PushCurrent => self.push(self.top()),
                Op::Pop(count) => exact &= self.pop(count) == count,
            }
        }
        exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: StateId = StateId(0);
    const A: StateId = StateId(1);
    const B: StateId = StateId(2);

    #[test]
    fn starts_at_root() {
        let stack = StateStack::new(ROOT);
        assert_eq!(stack.top(), ROOT);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn pops_are_clamped_at_the_bottom() {
        let mut stack = StateStack::new(ROOT);
        stack.push(A);
        assert_eq!(stack.pop(5), 1);
        assert_eq!(stack.top(), ROOT);
        assert_eq!(stack.pop(1), 0);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn applies_ops_in_order() {
        let mut stack = StateStack::new(ROOT);
        assert!(stack.apply(&[Op::Push(A), Op::PushCurrent, Op::Push(B)]));
        assert_eq!(stack.frames().collect::<Vec<_>>(), vec![ROOT, A, A, B]);

        assert!(stack.apply(&[Op::Pop(2), Op::Push(B)]));
        assert_eq!(stack.frames().collect::<Vec<_>>(), vec![ROOT, A, B]);

        assert!(!stack.apply(&[Op::Pop(9)]));
        assert_eq!(stack.top(), ROOT);
    }
}
