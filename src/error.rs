//! Error types for the move record.

use thiserror::Error;

/// A wire color value outside `0..=2`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid color value {0}, expected 0 (empty), 1 (black) or 2 (white)")]
pub struct InvalidColor(pub u8);

/// Failures of tree navigation and of (de)serializing a move tree.
///
/// Everything except `NodeNotInTree` describes a serialized tree that cannot
/// be trusted to build parent/child links.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("the serialized tree is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("root node {0} is not among the serialized nodes")]
    MissingRoot(String),
    #[error("root node {0} has a parent")]
    RootHasParent(String),
    #[error("node stored under key {key} carries id {id}")]
    KeyMismatch { key: String, id: String },
    #[error("node {node} names unknown parent {parent}")]
    UnknownParent { node: String, parent: String },
    #[error("node {node} names unknown child {child}")]
    UnknownChild { node: String, child: String },
    #[error("node {child} is listed as a child of {parent} but names parent {actual:?}")]
    LinkMismatch {
        parent: String,
        child: String,
        actual: Option<String>,
    },
    #[error("node {node} lists child {child} more than once")]
    DuplicateChild { node: String, child: String },
    #[error("node {0} is not reachable from the root")]
    Unreachable(String),
    #[error("pointer references unknown node {0}")]
    UnknownPointerNode(String),
    #[error("pointer move number {pointer} disagrees with node {node} at depth {depth}")]
    PointerMismatch { node: String, pointer: u32, depth: u32 },
    #[error("node {0} is serialized more than once")]
    DuplicateNode(String),
    #[error("{what} is {value}, above the largest supported move number")]
    MoveNumberTooLarge { what: String, value: u32 },
    #[error("node {0} is not in this tree")]
    NodeNotInTree(String),
}
