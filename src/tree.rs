//! The branching game record.
//!
//! A [`MoveTree`] owns every [`MoveNode`] of one game in an arena and keeps a
//! pointer (cursor) to the node that is "the present position". Nodes link to
//! each other by id, which keeps the structure acyclic and makes the tree
//! trivially serializable.
//!
//! ## Wire format
//!
//! ```json
//! {
//!   "nodes": { "<id>": { "id", "x", "y", "color", "currentMoveNumber",
//!                        "capturedGroups", "parentId", "childrenIds" } },
//!   "rootNodeId": "<id>",
//!   "pointer": { "currentNodeId", "currentMoveNumber", "totalMoveNumber" }
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, trace, warn};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::board::{Board, Color, Stone};
use crate::constants::{DEFAULT_TOTAL_MOVE_NUMBER, MAX_MOVE_NUMBER};
use crate::error::TreeError;
use crate::group::Group;
use crate::node::{MoveNode, NodeId, SerializedMoveNode};

/// The cursor into the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamePointer {
    pub current_node: NodeId,
    /// Depth of `current_node`.
    pub current_move_number: u32,
    /// Moves ever added since the last clear; only used to mint ids.
    pub total_move_number: u32,
}

/// The `nodes` object of the wire format, in the order it was written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeMap(pub Vec<(String, SerializedMoveNode)>);

impl Serialize for NodeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, node)| (key, node)))
    }
}

impl<'de> Deserialize<'de> for NodeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodeMapVisitor;

        impl<'de> Visitor<'de> for NodeMapVisitor {
            type Value = NodeMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from node id to serialized node")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<NodeMap, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, SerializedMoveNode>()? {
                    entries.push(entry);
                }
                Ok(NodeMap(entries))
            }
        }

        deserializer.deserialize_map(NodeMapVisitor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedPointer {
    pub current_node_id: NodeId,
    pub current_move_number: u32,
    pub total_move_number: u32,
}

/// A whole tree plus cursor, ready for JSON transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedMoveTree {
    pub nodes: NodeMap,
    pub root_node_id: NodeId,
    pub pointer: SerializedPointer,
}

/// Game history as a tree of moves with a cursor.
#[derive(Clone, Debug)]
pub struct MoveTree {
    nodes: Vec<MoveNode>,
    index: HashMap<NodeId, usize>,
    root: usize,
    pointer: GamePointer,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for MoveTree {
    /// Trees are equal when they hold the same nodes (compared by id, with
    /// links and payload) and the same root and pointer. Arena order is not
    /// part of a tree's identity.
    fn eq(&self, other: &Self) -> bool {
        self.root_node().id() == other.root_node().id()
            && self.pointer == other.pointer
            && self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .all(|node| other.node(node.id().as_str()) == Some(node))
    }
}

impl Eq for MoveTree {}

impl MoveTree {
    /// Create a tree holding only the root, with the cursor on it.
    pub fn new() -> Self {
        let root = MoveNode::root();
        let root_id = root.id().clone();
        Self {
            nodes: vec![root],
            index: HashMap::from([(root_id.clone(), 0)]),
            root: 0,
            pointer: GamePointer {
                current_node: root_id,
                current_move_number: 0,
                total_move_number: DEFAULT_TOTAL_MOVE_NUMBER,
            },
        }
    }

    /// The empty starting position.
    pub fn root_node(&self) -> &MoveNode {
        &self.nodes[self.root]
    }

    /// The cursor: current node, its depth and the id counter.
    pub fn pointer(&self) -> &GamePointer {
        &self.pointer
    }

    /// The node the cursor points at.
    pub fn current_node(&self) -> &MoveNode {
        &self.nodes[self.index[self.pointer.current_node.as_str()]]
    }

    /// Direct lookup by id.
    pub fn node(&self, id: &str) -> Option<&MoveNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root, so it is "empty" when nothing else.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Record `stone` as a new child of the current node and move there.
    ///
    /// Legality is the caller's concern. When the current node already has
    /// children the move opens a new branch after them.
    pub fn add_move(&mut self, stone: Stone, captured_groups: Vec<Group>) -> &MoveNode {
        let parent = self.index[self.pointer.current_node.as_str()];
        let node = MoveNode::new(
            stone,
            Some(&mut self.nodes[parent]),
            self.pointer.total_move_number,
            captured_groups,
        );
        let id = node.id().clone();
        let depth = node.current_move_number();
        debug!(
            "move {id}: {} at ({}, {}), depth {depth}, captures {}",
            stone.color,
            stone.x,
            stone.y,
            node.captured_groups().len()
        );

        self.nodes.push(node);
        let index = self.nodes.len() - 1;
        self.index.insert(id.clone(), index);
        self.pointer = GamePointer {
            current_node: id,
            current_move_number: depth,
            total_move_number: self.pointer.total_move_number + 1,
        };
        &self.nodes[index]
    }

    fn move_pointer(&mut self, id: NodeId) {
        let depth = self.nodes[self.index[id.as_str()]].current_move_number();
        self.pointer.current_node = id;
        self.pointer.current_move_number = depth;
    }

    /// Step back to the parent. Returns `false` at the root.
    pub fn previous_step(&mut self) -> bool {
        let Some(parent) = self.current_node().parent().cloned() else {
            trace!("previous step requested at the root");
            return false;
        };
        self.move_pointer(parent);
        true
    }

    /// Step forward along the main line (the first child). Returns `false`
    /// at a leaf.
    pub fn next_step(&mut self) -> bool {
        let Some(child) = self.current_node().children().first().cloned() else {
            trace!("next step requested at a leaf");
            return false;
        };
        self.move_pointer(child);
        true
    }

    /// Throw the whole record away and start over from a fresh root.
    pub fn clear(&mut self) {
        debug!("clearing move tree with {} nodes", self.nodes.len());
        *self = MoveTree::new();
    }

    /// Jump to any node of this tree, e.g. into a side branch.
    pub fn switch_to_node(&mut self, id: &str) -> Result<(), TreeError> {
        let Some(node) = self.node(id) else {
            return Err(TreeError::NodeNotInTree(id.to_string()));
        };
        let id = node.id().clone();
        self.move_pointer(id);
        Ok(())
    }

    /// Depth-first search over every branch, starting at the root.
    pub fn get_node_by_id(&self, id: &str) -> Option<&MoveNode> {
        self.pre_order().find(|node| node.id().as_str() == id)
    }

    /// All nodes, parents before children, earlier branches first.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Nodes from the root down to the current node.
    pub fn path_to_current(&self) -> Vec<&MoveNode> {
        let mut path = Vec::new();
        let mut cursor = Some(self.current_node());
        while let Some(node) = cursor {
            path.push(node);
            cursor = node.parent().and_then(|p| self.node(p.as_str()));
        }
        path.reverse();
        path
    }

    /// Nodes reached from the root by always taking the first child.
    pub fn main_line(&self) -> Vec<&MoveNode> {
        let mut line = vec![self.root_node()];
        while let Some(next) = line
            .last()
            .copied()
            .and_then(|node| node.children().first())
            .and_then(|id| self.node(id.as_str()))
        {
            line.push(next);
        }
        line
    }

    /// Whether `previous_step` would move.
    pub fn can_previous(&self) -> bool {
        !self.current_node().is_root()
    }

    /// Whether `next_step` would move.
    pub fn can_next(&self) -> bool {
        !self.current_node().children().is_empty()
    }

    /// Color to play after the current node. Black opens the game.
    pub fn next_color(&self) -> Color {
        match self.current_node().color() {
            Color::Black => Color::White,
            _ => Color::Black,
        }
    }

    /// Board at the current node: replay the path from the root, removing
    /// each move's captured stones before placing its own stone.
    pub fn board(&self, size: usize) -> Board {
        let mut board = Board::new(size);
        for node in self.path_to_current() {
            let Some(stone) = node.stone() else {
                continue;
            };
            for group in node.captured_groups() {
                for &point in &group.stones {
                    board.set(point, Color::Empty);
                }
            }
            board.set(stone.point(), stone.color);
        }
        board
    }

    /// Flatten the tree into its wire form, nodes in pre-order.
    pub fn to_serialized(&self) -> SerializedMoveTree {
        let nodes = self
            .pre_order()
            .map(|node| (node.id().to_string(), node.serialize()))
            .collect();
        SerializedMoveTree {
            nodes: NodeMap(nodes),
            root_node_id: self.root_node().id().clone(),
            pointer: SerializedPointer {
                current_node_id: self.pointer.current_node.clone(),
                current_move_number: self.pointer.current_move_number,
                total_move_number: self.pointer.total_move_number,
            },
        }
    }

    /// Serialize the tree and its cursor to JSON.
    pub fn serialize(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string(&self.to_serialized())?)
    }

    /// Parse and validate a tree written by [`MoveTree::serialize`].
    pub fn deserialize(data: &str) -> Result<MoveTree, TreeError> {
        let serialized: SerializedMoveTree = serde_json::from_str(data)?;
        MoveTree::from_serialized(serialized).inspect_err(|e| warn!("rejected move tree: {e}"))
    }

    /// Rebuild a tree, validating every link before trusting it.
    pub fn from_serialized(data: SerializedMoveTree) -> Result<MoveTree, TreeError> {
        let SerializedMoveTree {
            nodes: NodeMap(entries),
            root_node_id,
            pointer,
        } = data;

        // Create every node first so that all ids exist before linking.
        let mut nodes = Vec::with_capacity(entries.len());
        let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(entries.len());
        let mut links: Vec<(Option<NodeId>, Vec<NodeId>)> = Vec::with_capacity(entries.len());
        for (key, mut record) in entries {
            if key != record.id.as_str() {
                return Err(TreeError::KeyMismatch {
                    key,
                    id: record.id.to_string(),
                });
            }
            if index.contains_key(key.as_str()) {
                return Err(TreeError::DuplicateNode(key));
            }
            if record.current_move_number > MAX_MOVE_NUMBER {
                return Err(TreeError::MoveNumberTooLarge {
                    what: format!("depth of node {key}"),
                    value: record.current_move_number,
                });
            }
            let parent = record.parent_id.take();
            let children = std::mem::take(&mut record.children_ids);
            index.insert(record.id.clone(), nodes.len());
            links.push((parent, children));
            nodes.push(MoveNode::deserialize(record));
        }

        let root = *index
            .get(root_node_id.as_str())
            .ok_or_else(|| TreeError::MissingRoot(root_node_id.to_string()))?;
        if links[root].0.is_some() {
            return Err(TreeError::RootHasParent(root_node_id.to_string()));
        }

        for (i, (parent, children)) in links.iter().enumerate() {
            let id = nodes[i].id();
            if let Some(parent) = parent {
                if !index.contains_key(parent.as_str()) {
                    return Err(TreeError::UnknownParent {
                        node: id.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
            let mut seen: HashSet<&NodeId> = HashSet::with_capacity(children.len());
            for child in children {
                let Some(&c) = index.get(child.as_str()) else {
                    return Err(TreeError::UnknownChild {
                        node: id.to_string(),
                        child: child.to_string(),
                    });
                };
                if !seen.insert(child) {
                    return Err(TreeError::DuplicateChild {
                        node: id.to_string(),
                        child: child.to_string(),
                    });
                }
                if links[c].0.as_ref() != Some(id) {
                    return Err(TreeError::LinkMismatch {
                        parent: id.to_string(),
                        child: child.to_string(),
                        actual: links[c].0.as_ref().map(NodeId::to_string),
                    });
                }
            }
        }

        // Each node has one parent that lists it once, so a walk from the
        // root terminates; anything it misses hangs off a cycle or nothing.
        let mut reached = vec![false; nodes.len()];
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            if std::mem::replace(&mut reached[i], true) {
                continue;
            }
            stack.extend(links[i].1.iter().map(|child| index[child.as_str()]));
        }
        if let Some(stray) = reached.iter().position(|&r| !r) {
            return Err(TreeError::Unreachable(nodes[stray].id().to_string()));
        }

        for (node, (parent, children)) in nodes.iter_mut().zip(links) {
            node.set_parent(parent);
            for child in children {
                node.add_child(child);
            }
        }

        let current = *index
            .get(pointer.current_node_id.as_str())
            .ok_or_else(|| TreeError::UnknownPointerNode(pointer.current_node_id.to_string()))?;
        let depth = nodes[current].current_move_number();
        if depth != pointer.current_move_number {
            return Err(TreeError::PointerMismatch {
                node: pointer.current_node_id.to_string(),
                pointer: pointer.current_move_number,
                depth,
            });
        }

        let mut total_move_number = pointer.total_move_number;
        let highest_id = nodes
            .iter()
            .filter_map(|node| node.id().as_str().parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        if highest_id > total_move_number {
            warn!(
                "total move number {total_move_number} is behind node id {highest_id}, raising it"
            );
            total_move_number = highest_id;
        }
        if total_move_number > MAX_MOVE_NUMBER {
            return Err(TreeError::MoveNumberTooLarge {
                what: "totalMoveNumber".to_string(),
                value: total_move_number,
            });
        }

        debug!(
            "restored move tree with {} nodes, pointer at {}",
            nodes.len(),
            pointer.current_node_id
        );
        Ok(MoveTree {
            nodes,
            index,
            root,
            pointer: GamePointer {
                current_node: pointer.current_node_id,
                current_move_number: pointer.current_move_number,
                total_move_number,
            },
        })
    }
}

/// Pre-order walk over a [`MoveTree`].
pub struct PreOrder<'a> {
    tree: &'a MoveTree,
    stack: Vec<usize>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a MoveNode;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let i = self.stack.pop()?;
        let node = &tree.nodes[i];
        self.stack.extend(
            node.children()
                .iter()
                .rev()
                .filter_map(|c| tree.index.get(c.as_str()).copied()),
        );
        Some(node)
    }
}
