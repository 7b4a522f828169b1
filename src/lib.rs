//! sgf-go: SGF game records for Go.
//!
//! This crate reads SGF (FF[4]) text into game trees, edits them through a
//! cursor-based engine with bookmarks and change events, and writes them
//! back out as canonical SGF.
//!
//! ## Modules
//!
//! - [`parser`] / [`renderer`] - SGF text in and out
//! - [`node`], [`property`], [`values`] - the game tree and typed property values
//! - [`cursor`] - a zipper over one tree, with board and game-info projections
//! - [`engine`] - navigation, bookmarks, edits and events
//! - [`path`] - bookmark step lists and their renumbering
//! - [`board`] - board state replayed along a path
//! - [`game_info`] - players, result, rules
//! - [`bigfloat`] - exact decimals for SGF reals
//! - [`session`] - text command loop over an engine
//! - [`common`] - list and result helpers
//! - [`constants`] - size limits and property names
//!
//! ## Example
//!
//! ```
//! use sgf_go::engine::GoEngine;
//! use sgf_go::parser::parse_one;
//! use sgf_go::renderer::render_tree;
//! use sgf_go::values::{Color, Coord, Move};
//!
//! let root = parse_one("(;SZ[9];B[ab];W[cd])").unwrap();
//! let mut engine = GoEngine::new(root);
//! engine.go_down(0).unwrap();
//! engine.go_down(0).unwrap();
//! engine.play_move(Color::Black, Move::Play(Coord::new(4, 4))).unwrap();
//! engine.modify_comment(|_| "center".to_string()).unwrap();
//!
//! let sgf = render_tree(&engine.into_root());
//! assert_eq!(sgf, "(;SZ[9];B[ab];W[cd];B[ee]C[center])\n");
//! ```

pub mod bigfloat;
pub mod board;
pub mod common;
pub mod constants;
pub mod cursor;
pub mod engine;
pub mod game_info;
pub mod node;
pub mod parser;
pub mod path;
pub mod property;
pub mod renderer;
pub mod session;
pub mod values;
