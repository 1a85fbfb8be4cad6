//! Kifu-Rust: a branching Go game recorder.
//!
//! This crate records a game of Go as a tree of moves. It enforces capture
//! and suicide rules on every placement and keeps an undo/redo/jump cursor.
//! The whole record serializes to a stable JSON format.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and record sentinels
//! - [`board`] - Points, colors and the 2D board grid
//! - [`group`] - Flood fill for stone groups and their liberties
//! - [`capture`] - Capture resolution and move legality
//! - [`node`] - A single recorded move
//! - [`tree`] - The move tree, its cursor and (de)serialization
//! - [`session`] - A game being recorded, tying rules, tree and storage together
//! - [`store`] - Draft persistence
//! - [`protocol`] - GTP-style text protocol over a session
//!
//! ## Example
//!
//! ```
//! use kifu_rust::board::{Color, Stone};
//! use kifu_rust::capture::CaptureService;
//! use kifu_rust::tree::MoveTree;
//!
//! let rules = CaptureService::new(19);
//! let mut tree = MoveTree::new();
//!
//! let stone = Stone::new(3, 3, tree.next_color());
//! let board = tree.board(19);
//! assert!(rules.is_legal_move(Some(&stone), &board));
//! let captured = rules.captured_groups(&stone, &board);
//! tree.add_move(stone, captured);
//!
//! let json = tree.serialize().unwrap();
//! let restored = MoveTree::deserialize(&json).unwrap();
//! assert_eq!(restored, tree);
//! assert_eq!(restored.board(19).get(stone.point()), Some(Color::Black));
//! ```

pub mod board;
pub mod capture;
pub mod constants;
pub mod error;
pub mod group;
pub mod node;
pub mod protocol;
pub mod session;
pub mod store;
pub mod tree;
