//! One recorded ply and its links into the move tree.
//!
//! Nodes refer to their parent and children by [`NodeId`] rather than by
//! reference; the owning [`MoveTree`](crate::tree::MoveTree) resolves ids.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Color, Point, Stone};
use crate::constants::{ROOT_COORD, ROOT_NODE_ID};
use crate::group::Group;

/// Stable identifier of a node, unique within one tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// The fixed id every root carries.
    pub fn root() -> Self {
        NodeId(ROOT_NODE_ID.to_string())
    }

    /// Id of a node created while the tree had seen `total_move_number` moves.
    pub fn from_move_count(total_move_number: u32) -> Self {
        NodeId((u64::from(total_move_number) + 1).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Flat, reference-free form of a node used on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedMoveNode {
    pub id: NodeId,
    pub x: i32,
    pub y: i32,
    pub color: Color,
    pub current_move_number: u32,
    pub captured_groups: Vec<Group>,
    pub parent_id: Option<NodeId>,
    pub children_ids: Vec<NodeId>,
}

/// A single move (or the empty root) in the game record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveNode {
    id: NodeId,
    x: i32,
    y: i32,
    color: Color,
    current_move_number: u32,
    captured_groups: Vec<Group>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MoveNode {
    /// Create a node for `stone` and register it with `parent`.
    ///
    /// The depth is one more than the parent's (0 without a parent) and the
    /// id is minted from `total_move_number`.
    pub fn new(
        stone: Stone,
        parent: Option<&mut MoveNode>,
        total_move_number: u32,
        captured_groups: Vec<Group>,
    ) -> Self {
        let id = NodeId::from_move_count(total_move_number);
        let current_move_number = parent.as_ref().map_or(0, |p| p.current_move_number + 1);
        let parent_id = parent.map(|p| {
            p.add_child(id.clone());
            p.id.clone()
        });
        Self {
            id,
            x: stone.x,
            y: stone.y,
            color: stone.color,
            current_move_number,
            captured_groups,
            parent: parent_id,
            children: Vec::new(),
        }
    }

    /// The empty starting position, carrying the fixed root id.
    pub fn root() -> Self {
        let mut node = MoveNode::new(
            Stone::new(ROOT_COORD, ROOT_COORD, Color::Empty),
            None,
            0,
            Vec::new(),
        );
        node.set_id(NodeId::root());
        node
    }

    /// Stable id of this node within its tree.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Replace the id. Parent and children are not updated.
    pub fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    /// Column of the stone, `-1` on the root.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Row of the stone, `-1` on the root.
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Where the stone was played.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Color of the stone, `Empty` on the root.
    pub fn color(&self) -> Color {
        self.color
    }

    /// The stone this node placed, or `None` for the root.
    pub fn stone(&self) -> Option<Stone> {
        (self.x >= 0 && self.y >= 0 && self.color.is_stone())
            .then(|| Stone::new(self.x, self.y, self.color))
    }

    /// Depth from the root (root = 0).
    pub fn current_move_number(&self) -> u32 {
        self.current_move_number
    }

    /// Overwrite the stored depth.
    pub fn set_current_move_number(&mut self, move_number: u32) {
        self.current_move_number = move_number;
    }

    /// Opponent groups this move removed from the board.
    pub fn captured_groups(&self) -> &[Group] {
        &self.captured_groups
    }

    /// Id of the parent, `None` only for the root.
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Children in the order they were explored; the first is the main line.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// True for the node without a parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Append `child` unless it is already a child.
    pub fn add_child(&mut self, child: NodeId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    /// Remove `child`; a node that is not a child is ignored.
    pub fn remove_child(&mut self, child: &NodeId) {
        if let Some(index) = self.children.iter().position(|c| c == child) {
            self.children.remove(index);
        }
    }

    /// The flat wire form of this node.
    pub fn serialize(&self) -> SerializedMoveNode {
        SerializedMoveNode {
            id: self.id.clone(),
            x: self.x,
            y: self.y,
            color: self.color,
            current_move_number: self.current_move_number,
            captured_groups: self.captured_groups.clone(),
            parent_id: self.parent.clone(),
            children_ids: self.children.clone(),
        }
    }

    /// Rebuild a node from its flat record, keeping its id and depth as
    /// stored. The parent is left unset and the children empty; the tree
    /// relinks them once every node exists.
    pub fn deserialize(data: SerializedMoveNode) -> Self {
        let mut node = MoveNode::new(
            Stone::new(data.x, data.y, data.color),
            None,
            0,
            data.captured_groups,
        );
        node.set_id(data.id);
        node.set_current_move_number(data.current_move_number);
        node
    }
}
