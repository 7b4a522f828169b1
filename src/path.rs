//! Bookmarks: saved tree positions and the steps that lead back to them.
//!
//! A [`PathStack`] holds one step list per bookmark. Each list describes how
//! to walk from the cursor's *current* position back to where the bookmark
//! was pushed, so it changes as the cursor moves:
//!
//! - every navigation step records its inverse on the top bookmark, or
//!   cancels the newest recorded step if it is exactly that step;
//! - dropping a bookmark appends its steps to the one below, since the older
//!   bookmark is reached by first walking back to the dropped one;
//! - inserting a child renumbers steps that pass through the current node's
//!   children.
//!
//! Within a list the last element is the next step to take.

use std::fmt;

/// One move between a node and its parent. The index is always the index of
/// the child involved: `GoUp(i)` leaves child `i`, `GoDown(i)` enters it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    GoUp(usize),
    GoDown(usize),
}

impl Step {
    pub fn inverse(self) -> Step {
        match self {
            Step::GoUp(i) => Step::GoDown(i),
            Step::GoDown(i) => Step::GoUp(i),
        }
    }

    fn map_index(self, f: impl Fn(usize) -> usize) -> Step {
        match self {
            Step::GoUp(i) => Step::GoUp(f(i)),
            Step::GoDown(i) => Step::GoDown(f(i)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::GoUp(i) => write!(f, "up from {i}"),
            Step::GoDown(i) => write!(f, "down to {i}"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathStack {
    paths: Vec<Vec<Step>>,
}

impl PathStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of bookmarks.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn push(&mut self) {
        self.paths.push(Vec::new());
    }

    /// Steps back to the top bookmark, in the order they are taken.
    pub fn top_steps(&self) -> Option<impl Iterator<Item = Step> + '_> {
        self.paths.last().map(|p| p.iter().rev().copied())
    }

    /// The next step towards the top bookmark.
    pub fn next_step(&self) -> Option<Step> {
        self.paths.last().and_then(|p| p.last().copied())
    }

    /// Length of the top bookmark's step list.
    pub fn top_len(&self) -> Option<usize> {
        self.paths.last().map(Vec::len)
    }

    /// Note that the cursor just took `taken`.
    pub fn record(&mut self, taken: Step) {
        if let Some(top) = self.paths.last_mut() {
            if top.last() == Some(&taken) {
                top.pop();
            } else {
                top.push(taken.inverse());
            }
        }
    }

    /// Remove the top bookmark, returning its remaining steps in taking order.
    pub fn pop(&mut self) -> Option<Vec<Step>> {
        self.paths.pop().map(|mut p| {
            p.reverse();
            p
        })
    }

    /// Remove the top bookmark without walking back to it.
    ///
    /// Its steps move to the bookmark below, which is reached through the
    /// dropped position. Returns false if there was no bookmark.
    pub fn drop_top(&mut self) -> bool {
        match self.paths.pop() {
            Some(top) => {
                if let Some(next) = self.paths.last_mut() {
                    next.extend(top);
                }
                true
            }
            None => false,
        }
    }

    /// Rewrite every step that enters or leaves a child of the current node.
    ///
    /// Steps are followed in the order they would be taken across the whole
    /// stack, tracking the position relative to the current node, so a step
    /// is rewritten whether the walk starts there, returns there from above,
    /// or passes through it.
    pub fn map_current_node_children(&mut self, f: impl Fn(usize) -> usize) {
        // Child indices left while climbing above the current node, and taken
        // while descending from the highest point reached.
        let mut up: Vec<usize> = Vec::new();
        let mut down: Vec<usize> = Vec::new();
        for path in self.paths.iter_mut().rev() {
            for step in path.iter_mut().rev() {
                match *step {
                    Step::GoUp(i) => {
                        if down.is_empty() {
                            up.push(i);
                        } else {
                            if up.is_empty() && down.len() == 1 {
                                *step = step.map_index(&f);
                            }
                            down.pop();
                        }
                    }
                    Step::GoDown(i) => {
                        if up.is_empty() && down.is_empty() {
                            *step = step.map_index(&f);
                            down.push(i);
                        } else if down.is_empty() && up.last() == Some(&i) {
                            up.pop();
                        } else {
                            down.push(i);
                        }
                    }
                }
            }
        }
    }

    /// Account for a child inserted at `index` under the current node.
    pub fn shift_for_insert(&mut self, index: usize) {
        self.map_current_node_children(|i| if i >= index { i + 1 } else { i });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Step::{GoDown, GoUp};

    fn stack(paths: Vec<Vec<Step>>) -> PathStack {
        PathStack { paths }
    }

    #[test]
    fn test_record_only_when_bookmarked() {
        let mut s = PathStack::new();
        s.record(GoDown(0));
        assert!(s.is_empty());

        s.push();
        s.record(GoDown(1));
        s.record(GoDown(0));
        assert_eq!(s.top_steps().unwrap().collect::<Vec<_>>(), vec![GoUp(0), GoUp(1)]);
    }

    #[test]
    fn test_inverse_step_cancels() {
        let mut s = PathStack::new();
        s.push();
        s.record(GoDown(2));
        s.record(GoUp(2));
        assert_eq!(s.top_len(), Some(0));

        s.record(GoUp(1));
        s.record(GoDown(3));
        assert_eq!(s.top_len(), Some(2));
    }

    #[test]
    fn test_drop_merges_into_next() {
        let mut s = PathStack::new();
        s.push();
        s.record(GoDown(0));
        s.push();
        s.record(GoDown(1));
        assert!(s.drop_top());
        assert_eq!(s.len(), 1);
        assert_eq!(s.top_steps().unwrap().collect::<Vec<_>>(), vec![GoUp(1), GoUp(0)]);
        assert!(s.drop_top());
        assert!(!s.drop_top());
    }

    #[test]
    fn test_pop_returns_taking_order() {
        let mut s = PathStack::new();
        s.push();
        s.record(GoUp(4));
        s.record(GoDown(1));
        assert_eq!(s.pop(), Some(vec![GoUp(1), GoDown(4)]));
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn test_shift_steps_starting_at_current_node() {
        // Bookmark is at child 2 of the current node: the way back is down 2.
        let mut s = stack(vec![vec![GoDown(2)]]);
        s.shift_for_insert(1);
        assert_eq!(s, stack(vec![vec![GoDown(3)]]));

        let mut s = stack(vec![vec![GoDown(2)]]);
        s.shift_for_insert(3);
        assert_eq!(s, stack(vec![vec![GoDown(2)]]));
    }

    #[test]
    fn test_shift_steps_leaving_a_child() {
        // Taking order: down 1, down 0, up from 0, up from 1.
        let mut s = stack(vec![vec![GoUp(1), GoUp(0), GoDown(0), GoDown(1)]]);
        s.shift_for_insert(0);
        assert_eq!(s, stack(vec![vec![GoUp(2), GoUp(0), GoDown(0), GoDown(2)]]));
    }

    #[test]
    fn test_shift_steps_returning_from_above() {
        // Taking order: up from 3 (leaving the current node), down 3 (back to
        // it), down 0 (into its child 0).
        let mut s = stack(vec![vec![GoDown(0), GoDown(3), GoUp(3)]]);
        s.shift_for_insert(0);
        assert_eq!(s, stack(vec![vec![GoDown(1), GoDown(3), GoUp(3)]]));

        // Going to a sibling instead never touches the current node's children.
        let mut s = stack(vec![vec![GoDown(0), GoDown(2), GoUp(3)]]);
        s.shift_for_insert(0);
        assert_eq!(s, stack(vec![vec![GoDown(0), GoDown(2), GoUp(3)]]));
    }

    #[test]
    fn test_shift_spans_bookmarks() {
        // The top bookmark leaves the current node upwards and comes back; the
        // older one then enters child 1 of the current node.
        let mut s = stack(vec![vec![GoDown(1)], vec![GoDown(0), GoUp(0)]]);
        s.shift_for_insert(1);
        assert_eq!(s, stack(vec![vec![GoDown(2)], vec![GoDown(0), GoUp(0)]]));
    }
}
