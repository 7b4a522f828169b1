//! A zipper over a game tree.
//!
//! The [`Cursor`] owns the tree while it is being walked: the focused node
//! is held directly, and every ancestor is held as a crumb with its
//! properties and the siblings to either side of the path. Moving down or up
//! moves nodes between the focus and the crumbs without copying subtrees.
//! Cloning a cursor snapshots the whole tree.

use std::iter;

use thiserror::Error;

use crate::board::Board;
use crate::constants::DEFAULT_BOARD_SIZE;
use crate::game_info::{GameInfo, RootInfo};
use crate::node::Node;
use crate::path::Step;
use crate::property::Property;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("cannot go up from the root node")]
    AtRoot,
    #[error("node has no child {index} (it has {count})")]
    NoSuchChild { index: usize, count: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Crumb {
    properties: Vec<Property>,
    left: Vec<Node>,
    right: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    node: Node,
    crumbs: Vec<Crumb>,
}

/// A node reached while checking a walk: on the cursor's root path, or off it.
#[derive(Clone, Copy)]
enum Loc<'a> {
    Spine(usize),
    Off(&'a Node),
}

impl Cursor {
    /// A cursor at the root of `root`.
    pub fn new(root: Node) -> Self {
        Self {
            node: root,
            crumbs: Vec::new(),
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn properties(&self) -> &[Property] {
        &self.node.properties
    }

    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    pub fn has_parent(&self) -> bool {
        !self.crumbs.is_empty()
    }

    /// Index of the current node among its siblings; `None` at the root.
    pub fn child_index(&self) -> Option<usize> {
        self.crumbs.last().map(|c| c.left.len())
    }

    /// Number of steps from the root.
    pub fn depth(&self) -> usize {
        self.crumbs.len()
    }

    /// Child indices from the root down to the current node.
    pub fn path(&self) -> Vec<usize> {
        self.crumbs.iter().map(|c| c.left.len()).collect()
    }

    pub fn parent_properties(&self) -> Option<&[Property]> {
        self.crumbs.last().map(|c| c.properties.as_slice())
    }

    /// Property lists from the root down to the current node.
    pub fn path_properties(&self) -> impl Iterator<Item = &[Property]> + '_ {
        self.crumbs
            .iter()
            .map(|c| c.properties.as_slice())
            .chain(iter::once(self.node.properties.as_slice()))
    }

    pub fn go_down(&mut self, index: usize) -> Result<(), CursorError> {
        let count = self.node.children.len();
        if index >= count {
            return Err(CursorError::NoSuchChild { index, count });
        }
        let mut left = std::mem::take(&mut self.node.children);
        let right = left.split_off(index + 1);
        let Some(child) = left.pop() else {
            return Err(CursorError::NoSuchChild { index, count });
        };
        let properties = std::mem::take(&mut self.node.properties);
        self.crumbs.push(Crumb {
            properties,
            left,
            right,
        });
        self.node = child;
        Ok(())
    }

    pub fn go_up(&mut self) -> Result<(), CursorError> {
        let crumb = self.crumbs.pop().ok_or(CursorError::AtRoot)?;
        let child = std::mem::take(&mut self.node);
        let mut children = crumb.left;
        children.push(child);
        children.extend(crumb.right);
        self.node = Node {
            properties: crumb.properties,
            children,
        };
        Ok(())
    }

    /// A new cursor at child `index`, leaving this one where it is.
    pub fn child(&self, index: usize) -> Option<Cursor> {
        let mut c = self.clone();
        c.go_down(index).ok()?;
        Some(c)
    }

    /// A new cursor at the parent, leaving this one where it is.
    pub fn parent(&self) -> Option<Cursor> {
        let mut c = self.clone();
        c.go_up().ok()?;
        Some(c)
    }

    pub fn modify_node(&mut self, f: impl FnOnce(&mut Node)) {
        f(&mut self.node);
    }

    /// Give the tree back, rewound to its root.
    pub fn into_root(mut self) -> Node {
        while self.go_up().is_ok() {}
        self.node
    }

    /// A copy of the whole tree.
    pub fn root_node(&self) -> Node {
        self.clone().into_root()
    }

    fn root_properties(&self) -> &[Property] {
        match self.crumbs.first() {
            Some(c) => &c.properties,
            None => &self.node.properties,
        }
    }

    /// Board state after replaying the path from the root.
    pub fn board(&self) -> Board {
        Board::from_path(self.path_properties())
    }

    /// Game info in effect here: the nearest ancestor-or-self node with
    /// game-info properties, plus the root's board size.
    pub fn game_info(&self) -> GameInfo {
        let root_info = self
            .root_properties()
            .iter()
            .find_map(|p| match p {
                Property::SZ(size) => Some(RootInfo::from(*size)),
                _ => None,
            })
            .unwrap_or(RootInfo {
                width: DEFAULT_BOARD_SIZE,
                height: DEFAULT_BOARD_SIZE,
            });
        let path: Vec<&[Property]> = self.path_properties().collect();
        let info_node = path
            .iter()
            .rev()
            .find(|props| props.iter().any(Property::is_game_info))
            .copied()
            .unwrap_or(&[]);
        GameInfo::from_properties(root_info, info_node)
    }

    /// Whether taking `steps` in order from here is a valid walk: every
    /// `GoDown(i)` has a child `i` and every `GoUp(i)` leaves child `i`.
    pub fn can_walk(&self, steps: impl IntoIterator<Item = Step>) -> bool {
        // Each entry is a node on the walk and its index under the previous one.
        let mut chain: Vec<(Loc<'_>, Option<usize>)> = (0..=self.crumbs.len())
            .map(|d| {
                let index = d.checked_sub(1).map(|p| self.crumbs[p].left.len());
                (Loc::Spine(d), index)
            })
            .collect();
        for step in steps {
            match step {
                Step::GoUp(i) => match chain.pop() {
                    Some((_, Some(index))) if index == i && !chain.is_empty() => {}
                    _ => return false,
                },
                Step::GoDown(i) => {
                    let Some(&(loc, _)) = chain.last() else {
                        return false;
                    };
                    match self.child_loc(loc, i) {
                        Some(child) => chain.push((child, Some(i))),
                        None => return false,
                    }
                }
            }
        }
        true
    }

    fn child_loc<'a>(&'a self, loc: Loc<'a>, i: usize) -> Option<Loc<'a>> {
        match loc {
            Loc::Off(node) => node.children.get(i).map(Loc::Off),
            Loc::Spine(d) if d == self.crumbs.len() => self.node.children.get(i).map(Loc::Off),
            Loc::Spine(d) => {
                let crumb = &self.crumbs[d];
                let on_path = crumb.left.len();
                if i < on_path {
                    Some(Loc::Off(&crumb.left[i]))
                } else if i == on_path {
                    Some(Loc::Spine(d + 1))
                } else {
                    crumb.right.get(i - on_path - 1).map(Loc::Off)
                }
            }
        }
    }
}
