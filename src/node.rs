//! Game tree nodes and collections.

use crate::common::{remove_where, replace_or_push};
use crate::constants::{FILE_FORMAT, GAME_GO};
use crate::property::Property;
use crate::values::BoardSize;

/// One node of a game tree: its properties and owned children.
///
/// Properties keep their insertion order so files render back as written.
/// Game records are mostly long single-child chains, so every walk over a
/// tree, including clone, comparison and drop, uses an explicit stack rather
/// than recursion.
#[derive(Debug, Default)]
pub struct Node {
    pub properties: Vec<Property>,
    pub children: Vec<Node>,
}

/// The game trees of one SGF file, in order.
pub type Collection = Vec<Node>;

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(properties: Vec<Property>) -> Self {
        Self {
            properties,
            children: Vec::new(),
        }
    }

    /// A root node for a new game on a `width` x `height` board.
    pub fn root(width: usize, height: usize) -> Self {
        Self::with_properties(vec![
            Property::FF(FILE_FORMAT),
            Property::GM(GAME_GO),
            Property::SZ(BoardSize { width, height }),
        ])
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Add a property, replacing one with the same name in place.
    pub fn put_property(&mut self, property: Property) -> Option<Property> {
        let name = property.name().to_string();
        replace_or_push(&mut self.properties, property, |p| p.name() == name)
    }

    /// Remove every property named `name`. Returns whether any was removed.
    pub fn remove_property(&mut self, name: &str) -> bool {
        remove_where(&mut self.properties, |p| p.name() == name) > 0
    }

    pub fn has_game_info(&self) -> bool {
        self.properties.iter().any(Property::is_game_info)
    }

    pub fn board_size(&self) -> Option<BoardSize> {
        self.properties.iter().find_map(|p| match p {
            Property::SZ(size) => Some(*size),
            _ => None,
        })
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Visit this node and every descendant, depth first.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            f(node);
            stack.extend(node.children.iter_mut().rev());
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count_nodes(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(&node.children);
        }
        count
    }

    /// Length of the longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        // Each entry is a source node and its copy; a copy is finished once it
        // has as many children as its source.
        let mut stack = vec![(self, self.shallow_copy())];
        let mut root = Node::new();
        while let Some((source, copy)) = stack.pop() {
            if let Some(child) = source.children.get(copy.children.len()) {
                stack.push((source, copy));
                stack.push((child, child.shallow_copy()));
                continue;
            }
            match stack.last_mut() {
                Some((_, parent)) => parent.children.push(copy),
                None => root = copy,
            }
        }
        root
    }
}

impl Node {
    fn shallow_copy(&self) -> Node {
        Node {
            properties: self.properties.clone(),
            children: Vec::with_capacity(self.children.len()),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.properties != b.properties || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl Eq for Node {}
