//! SGF text renderer.
//!
//! Output is canonical rather than a copy of the input: a run of single-child
//! nodes is written as one flat sequence, a node with several children opens
//! a parenthesized variation per child, and each game tree ends with a
//! newline. Reading the output back with [`crate::parser::parse`] gives the
//! same tree.

use crate::node::Node;

/// Render a whole collection.
pub fn render(collection: &[Node]) -> String {
    RenderStream::new(collection).collect()
}

/// Render one game tree.
pub fn render_tree(root: &Node) -> String {
    RenderStream::new(std::slice::from_ref(root)).collect()
}

/// Append `;` and the node's properties.
pub fn render_node(node: &Node, out: &mut String) {
    out.push(';');
    for p in &node.properties {
        p.render(out);
    }
}

#[derive(Clone, Copy, Debug)]
enum Work<'a> {
    /// Open a tree or variation starting at the node.
    Open(&'a Node),
    /// Write the node and continue with its children.
    Node(&'a Node),
    /// Close a tree (`top_level`) or variation.
    Close { top_level: bool },
}

/// Lazy renderer yielding the text in fragments, one node or parenthesis at
/// a time.
///
/// The stream borrows the tree and does no work until polled. Cloning it
/// saves its position, so rendering can be restarted from any point.
#[derive(Clone, Debug)]
pub struct RenderStream<'a> {
    /// Pending work, next item last.
    stack: Vec<Work<'a>>,
}

impl<'a> RenderStream<'a> {
    pub fn new(collection: &'a [Node]) -> Self {
        let mut stack = Vec::with_capacity(collection.len() * 2);
        for root in collection.iter().rev() {
            stack.push(Work::Close { top_level: true });
            stack.push(Work::Open(root));
        }
        Self { stack }
    }

    /// The same text, one character at a time.
    pub fn chars(self) -> impl Iterator<Item = char> + 'a {
        self.flat_map(|fragment| fragment.chars().collect::<Vec<_>>())
    }
}

impl Iterator for RenderStream<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self.stack.pop()? {
            Work::Open(node) => {
                self.stack.push(Work::Node(node));
                Some("(".to_string())
            }
            Work::Node(node) => {
                let mut out = String::new();
                render_node(node, &mut out);
                match node.children.as_slice() {
                    [] => {}
                    [only] => self.stack.push(Work::Node(only)),
                    children => {
                        for child in children.iter().rev() {
                            self.stack.push(Work::Close { top_level: false });
                            self.stack.push(Work::Open(child));
                        }
                    }
                }
                Some(out)
            }
            Work::Close { top_level: true } => Some(")\n".to_string()),
            Work::Close { top_level: false } => Some(")".to_string()),
        }
    }
}
