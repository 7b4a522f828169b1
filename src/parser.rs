//! SGF text parser.
//!
//! Parsing runs in two passes. The syntax pass reads the text into raw nodes
//! whose property values are still the escaped strings between brackets, and
//! stops at the first malformed construct. The conversion pass then turns
//! every raw property into a typed [`Property`], checks that each root has a
//! board size, and rewrites old-style `tt` passes. It visits every tree and
//! reports all problems at once; a collection loads only if every tree does.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::common::and_results;
use crate::constants::{BOARD_SIZE_PROPERTY, PASS_COMPAT_COORD, PASS_COMPAT_MAX_SIZE};
use crate::node::{Collection, Node};
use crate::property::{Property, is_valid_name};
use crate::values::{Coord, Move};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Malformed SGF structure.
    #[error("line {line}, column {column}: expected {expected}")]
    Syntax {
        line: usize,
        column: usize,
        expected: String,
    },
    /// A property value that does not fit its type. `tree` counts from 1.
    #[error("game tree {tree}: {name} at line {line}, column {column}: expected {expected}")]
    Value {
        tree: usize,
        name: String,
        line: usize,
        column: usize,
        expected: String,
    },
    #[error("game tree {tree}: root node has no board size (SZ) property")]
    MissingBoardSize { tree: usize },
    /// Every problem found while converting the trees of a collection.
    #[error("{}", ErrorList(.0))]
    Collection(Vec<ParseError>),
    #[error("expected exactly one game tree, found {0}")]
    TreeCount(usize),
    #[error("cannot read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl ParseError {
    /// The individual errors, with a collection flattened out.
    pub fn errors(&self) -> Vec<&ParseError> {
        match self {
            ParseError::Collection(errors) => errors.iter().flat_map(ParseError::errors).collect(),
            e => vec![e],
        }
    }
}

struct ErrorList<'a>(&'a [ParseError]);

impl fmt::Display for ErrorList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0.len();
        write!(f, "{n} error{}:", if n == 1 { "" } else { "s" })?;
        for e in self.0 {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

/// Parse every game tree in `text`.
pub fn parse(text: &str) -> Result<Collection, ParseError> {
    let raw = Scanner::new(text).collection()?;
    debug!(trees = raw.len(), "syntax pass done");

    let trees = raw
        .into_iter()
        .enumerate()
        .map(|(i, tree)| convert_tree(i + 1, tree));
    match and_results(trees) {
        Ok(collection) => Ok(collection),
        Err(per_tree) => {
            let errors: Vec<ParseError> = per_tree.into_iter().flatten().collect();
            warn!(errors = errors.len(), "collection rejected");
            Err(ParseError::Collection(errors))
        }
    }
}

/// Parse text that must hold exactly one game tree.
pub fn parse_one(text: &str) -> Result<Node, ParseError> {
    let mut collection = parse(text)?;
    match collection.len() {
        1 => Ok(collection.remove(0)),
        n => Err(ParseError::TreeCount(n)),
    }
}

/// Read and parse an SGF file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Collection, ParseError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), bytes = text.len(), "read file");
    parse(&text)
}

// =============================================================================
// Syntax pass
// =============================================================================

#[derive(Debug)]
struct RawProperty {
    name: String,
    values: Vec<String>,
    line: usize,
    column: usize,
}

#[derive(Debug, Default)]
struct RawNode {
    properties: Vec<RawProperty>,
    children: Vec<RawNode>,
}

impl Drop for RawNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// A game tree still being read: its node sequence and finished variations.
#[derive(Default)]
struct OpenTree {
    sequence: Vec<RawNode>,
    variations: Vec<RawNode>,
}

impl OpenTree {
    /// Chain the sequence and hang the variations off its last node.
    fn close(mut self) -> Option<RawNode> {
        let mut chain = std::mem::take(&mut self.variations);
        while let Some(mut node) = self.sequence.pop() {
            node.children = chain;
            chain = vec![node];
        }
        chain.pop()
    }
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, expected: &str) -> ParseError {
        ParseError::Syntax {
            line: self.line,
            column: self.column,
            expected: expected.to_string(),
        }
    }

    fn expect(&mut self, c: char, expected: &str) -> Result<(), ParseError> {
        if self.peek() != Some(c) {
            return Err(self.error(expected));
        }
        self.bump();
        Ok(())
    }

    fn collection(&mut self) -> Result<Vec<RawNode>, ParseError> {
        let mut trees = Vec::new();
        self.skip_whitespace();
        while self.peek() == Some('(') {
            trees.push(self.game_tree()?);
            self.skip_whitespace();
        }
        if self.peek().is_some() {
            return Err(self.error("'(' to start a game tree, or end of input"));
        }
        Ok(trees)
    }

    /// A parenthesized tree: its node sequence becomes a chain, and nested
    /// trees hang off the last node of the sequence. Nesting is tracked on an
    /// explicit stack, so deeply nested variations cannot exhaust the call
    /// stack.
    fn game_tree(&mut self) -> Result<RawNode, ParseError> {
        let mut open = vec![self.open_tree()?];
        loop {
            if self.peek() == Some('(') {
                open.push(self.open_tree()?);
                continue;
            }
            self.expect(')', "')' to close the game tree, or a node or variation")?;
            let tree = open
                .pop()
                .and_then(OpenTree::close)
                .ok_or_else(|| self.error("a node"))?;
            match open.last_mut() {
                Some(parent) => {
                    parent.variations.push(tree);
                    self.skip_whitespace();
                }
                None => return Ok(tree),
            }
        }
    }

    /// `(` and the node sequence that must follow it.
    fn open_tree(&mut self) -> Result<OpenTree, ParseError> {
        self.expect('(', "'(' to start a game tree")?;
        self.skip_whitespace();
        if self.peek() != Some(';') {
            return Err(self.error("';' to start a node"));
        }
        let mut tree = OpenTree::default();
        while self.peek() == Some(';') {
            tree.sequence.push(self.node()?);
        }
        Ok(tree)
    }

    fn node(&mut self) -> Result<RawNode, ParseError> {
        self.expect(';', "';' to start a node")?;
        self.skip_whitespace();
        let mut node = RawNode::default();
        while self.peek().is_some_and(|c| c.is_ascii_uppercase()) {
            node.properties.push(self.property()?);
        }
        Ok(node)
    }

    fn property(&mut self) -> Result<RawProperty, ParseError> {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_uppercase()) {
            self.bump();
        }
        let name = self.text[start..self.pos].to_string();
        if !is_valid_name(&name) {
            return Err(self.error("a property name"));
        }
        self.skip_whitespace();
        if self.peek() != Some('[') {
            return Err(self.error(&format!("'[' to start a value of {name}")));
        }
        let mut values = Vec::new();
        while self.peek() == Some('[') {
            values.push(self.value()?);
            self.skip_whitespace();
        }
        Ok(RawProperty {
            name,
            values,
            line,
            column,
        })
    }

    /// A bracketed value, returned with its escapes still in place.
    fn value(&mut self) -> Result<String, ParseError> {
        self.expect('[', "'['")?;
        let mut raw = String::new();
        loop {
            match self.bump() {
                Some(']') => return Ok(raw),
                Some('\\') => {
                    raw.push('\\');
                    if let Some(c) = self.bump() {
                        raw.push(c);
                    }
                }
                Some(c) => raw.push(c),
                None => return Err(self.error("']' to close the property value")),
            }
        }
    }
}

// =============================================================================
// Conversion pass
// =============================================================================

fn convert_tree(tree: usize, raw: RawNode) -> Result<Node, Vec<ParseError>> {
    let mut errors = Vec::new();
    let mut root = convert_node(tree, raw, &mut errors);

    match root.board_size() {
        Some(size) => {
            if size.width <= PASS_COMPAT_MAX_SIZE && size.height <= PASS_COMPAT_MAX_SIZE {
                let passes = normalize_passes(&mut root);
                if passes > 0 {
                    debug!(tree, passes, "rewrote tt moves as passes");
                }
            }
        }
        // An SZ that failed to parse has already been reported.
        None if !has_raw_board_size(&errors) => {
            errors.push(ParseError::MissingBoardSize { tree });
        }
        None => {}
    }

    if errors.is_empty() {
        Ok(root)
    } else {
        warn!(tree, errors = errors.len(), "game tree rejected");
        Err(errors)
    }
}

fn has_raw_board_size(errors: &[ParseError]) -> bool {
    errors
        .iter()
        .any(|e| matches!(e, ParseError::Value { name, .. } if name == BOARD_SIZE_PROPERTY))
}

/// Convert a raw tree, visiting nodes in document order so errors are
/// reported in the order they appear.
fn convert_node(tree: usize, raw: RawNode, errors: &mut Vec<ParseError>) -> Node {
    // Each entry is a converted node and the raw children still to convert.
    let mut stack = vec![convert_properties(tree, raw, errors)];
    let mut root = Node::new();
    while let Some((node, mut pending)) = stack.pop() {
        if let Some(child) = pending.next() {
            stack.push((node, pending));
            stack.push(convert_properties(tree, child, errors));
            continue;
        }
        match stack.last_mut() {
            Some((parent, _)) => parent.children.push(node),
            None => root = node,
        }
    }
    root
}

fn convert_properties(
    tree: usize,
    mut raw: RawNode,
    errors: &mut Vec<ParseError>,
) -> (Node, std::vec::IntoIter<RawNode>) {
    let mut properties = Vec::with_capacity(raw.properties.len());
    for p in std::mem::take(&mut raw.properties) {
        match Property::from_raw(&p.name, &p.values) {
            Ok(property) => properties.push(property),
            Err(expected) => errors.push(ParseError::Value {
                tree,
                name: p.name,
                line: p.line,
                column: p.column,
                expected,
            }),
        }
    }
    let children = std::mem::take(&mut raw.children);
    let node = Node {
        properties,
        children: Vec::with_capacity(children.len()),
    };
    (node, children.into_iter())
}

/// Rewrite every `B[tt]` and `W[tt]` below `root` as a pass.
fn normalize_passes(root: &mut Node) -> usize {
    let (x, y) = PASS_COMPAT_COORD;
    let tt = Move::Play(Coord::new(x, y));
    let mut count = 0;
    root.for_each_mut(&mut |node| {
        for p in &mut node.properties {
            if let Property::B(mv) | Property::W(mv) = p {
                if *mv == tt {
                    *mv = Move::Pass;
                    count += 1;
                }
            }
        }
    });
    count
}
