//! Malformed and hand-edited records must be rejected before any links are
//! built, and well-formed ones must come back unchanged.

use kifu_rust::board::{Color, Stone};
use kifu_rust::constants::MAX_MOVE_NUMBER;
use kifu_rust::error::TreeError;
use kifu_rust::node::{NodeId, SerializedMoveNode};
use kifu_rust::tree::{MoveTree, SerializedMoveTree};

/// Root "0" with move "1" and two replies "2" and "3", pointer on "2".
fn sample() -> SerializedMoveTree {
    let mut tree = MoveTree::new();
    tree.add_move(Stone::new(3, 3, Color::Black), Vec::new());
    tree.add_move(Stone::new(4, 4, Color::White), Vec::new());
    tree.previous_step();
    tree.add_move(Stone::new(5, 5, Color::White), Vec::new());
    tree.switch_to_node("2").unwrap();
    tree.to_serialized()
}

fn node<'a>(data: &'a mut SerializedMoveTree, key: &str) -> &'a mut SerializedMoveNode {
    data.nodes
        .0
        .iter_mut()
        .find(|(k, _)| k == key)
        .map(|(_, n)| n)
        .unwrap()
}

fn ids(list: &[&str]) -> Vec<NodeId> {
    list.iter().map(|&id| NodeId::from(id)).collect()
}

#[test]
fn test_sample_is_valid() {
    let data = sample();
    let keys: Vec<&str> = data.nodes.0.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["0", "1", "2", "3"]);
    let tree = MoveTree::from_serialized(data).unwrap();
    assert_eq!(tree.current_node().id().as_str(), "2");
    assert_eq!(tree.pointer().total_move_number, 3);
}

#[test]
fn test_wire_format() {
    let json = MoveTree::from_serialized(sample()).unwrap().serialize().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["rootNodeId"], "0");
    assert_eq!(value["pointer"]["currentNodeId"], "2");
    assert_eq!(value["pointer"]["currentMoveNumber"], 2);
    assert_eq!(value["pointer"]["totalMoveNumber"], 3);

    let root = &value["nodes"]["0"];
    assert_eq!(root["x"], -1);
    assert_eq!(root["color"], 0);
    assert!(root["parentId"].is_null());
    assert_eq!(root["childrenIds"], serde_json::json!(["1"]));

    let reply = &value["nodes"]["3"];
    assert_eq!(reply["color"], 2);
    assert_eq!(reply["currentMoveNumber"], 2);
    assert_eq!(reply["parentId"], "1");
    assert_eq!(reply["capturedGroups"], serde_json::json!([]));
}

#[test]
fn test_rejects_missing_root() {
    let mut data = sample();
    data.root_node_id = NodeId::from("9");
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::MissingRoot(id)) if id == "9"
    ));
}

#[test]
fn test_rejects_root_with_parent() {
    let mut data = sample();
    node(&mut data, "0").parent_id = Some(NodeId::from("1"));
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::RootHasParent(_))
    ));
}

#[test]
fn test_rejects_key_mismatch() {
    let mut data = sample();
    node(&mut data, "3").id = NodeId::from("7");
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::KeyMismatch { key, id }) if key == "3" && id == "7"
    ));
}

#[test]
fn test_rejects_duplicate_node() {
    let mut data = sample();
    let copy = data.nodes.0[1].clone();
    data.nodes.0.push(copy);
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::DuplicateNode(id)) if id == "1"
    ));
}

#[test]
fn test_rejects_unknown_parent() {
    let mut data = sample();
    node(&mut data, "1").children_ids = ids(&["3"]);
    node(&mut data, "2").parent_id = Some(NodeId::from("42"));
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::UnknownParent { node, parent }) if node == "2" && parent == "42"
    ));
}

#[test]
fn test_rejects_unknown_child() {
    let mut data = sample();
    node(&mut data, "1").children_ids.push(NodeId::from("42"));
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::UnknownChild { node, child }) if node == "1" && child == "42"
    ));
}

#[test]
fn test_rejects_duplicate_child() {
    let mut data = sample();
    node(&mut data, "1").children_ids = ids(&["2", "3", "2"]);
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::DuplicateChild { .. })
    ));
}

#[test]
fn test_rejects_link_mismatch() {
    let mut data = sample();
    node(&mut data, "3").parent_id = Some(NodeId::from("2"));
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::LinkMismatch { parent, child, actual })
            if parent == "1" && child == "3" && actual.as_deref() == Some("2")
    ));
}

#[test]
fn test_rejects_orphan() {
    let mut data = sample();
    // "3" still names "1" as parent but is no longer listed by it.
    node(&mut data, "1").children_ids = ids(&["2"]);
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::Unreachable(id)) if id == "3"
    ));
}

#[test]
fn test_rejects_cycle() {
    let mut data = sample();
    node(&mut data, "1").children_ids.clear();
    let a = node(&mut data, "2");
    a.parent_id = Some(NodeId::from("3"));
    a.children_ids = ids(&["3"]);
    let b = node(&mut data, "3");
    b.parent_id = Some(NodeId::from("2"));
    b.children_ids = ids(&["2"]);
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::Unreachable(_))
    ));
}

#[test]
fn test_rejects_unknown_pointer_node() {
    let mut data = sample();
    data.pointer.current_node_id = NodeId::from("42");
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::UnknownPointerNode(_))
    ));
}

#[test]
fn test_rejects_pointer_depth_mismatch() {
    let mut data = sample();
    data.pointer.current_move_number = 5;
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::PointerMismatch { pointer: 5, depth: 2, .. })
    ));
}

#[test]
fn test_rejects_out_of_range_color() {
    let json = MoveTree::from_serialized(sample()).unwrap().serialize().unwrap();
    let broken = json.replacen("\"color\":2", "\"color\":7", 1);
    assert_ne!(broken, json);
    assert!(matches!(
        MoveTree::deserialize(&broken),
        Err(TreeError::Json(_))
    ));
}

#[test]
fn test_stale_counter_is_raised() {
    let mut data = sample();
    data.pointer.total_move_number = 1;
    let mut tree = MoveTree::from_serialized(data).unwrap();
    assert_eq!(tree.pointer().total_move_number, 3);
    let id = tree
        .add_move(Stone::new(6, 6, Color::Black), Vec::new())
        .id()
        .clone();
    assert_eq!(id.as_str(), "4");
}

#[test]
fn test_rejects_counter_that_cannot_grow() {
    let mut data = sample();
    data.pointer.total_move_number = u32::MAX;
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::MoveNumberTooLarge { value: u32::MAX, .. })
    ));
}

#[test]
fn test_rejects_id_that_would_lift_counter_too_far() {
    let mut data = sample();
    let huge = u32::MAX.to_string();
    data.nodes.0[3].0 = huge.clone();
    node(&mut data, &huge).id = NodeId::from(huge.as_str());
    node(&mut data, "1").children_ids = ids(&["2", huge.as_str()]);
    assert!(matches!(
        MoveTree::from_serialized(data),
        Err(TreeError::MoveNumberTooLarge { value: u32::MAX, .. })
    ));
}

#[test]
fn test_rejects_depth_that_cannot_grow() {
    let text = r#"{
        "nodes": {
            "0": {"id":"0","x":-1,"y":-1,"color":0,"currentMoveNumber":4294967295,
                  "capturedGroups":[],"parentId":null,"childrenIds":[]}
        },
        "rootNodeId": "0",
        "pointer": {"currentNodeId":"0","currentMoveNumber":4294967295,"totalMoveNumber":0}
    }"#;
    assert!(matches!(
        MoveTree::deserialize(text),
        Err(TreeError::MoveNumberTooLarge { value: u32::MAX, .. })
    ));
}

#[test]
fn test_counter_at_the_limit_still_adds_moves() {
    let mut data = sample();
    data.pointer.total_move_number = MAX_MOVE_NUMBER;
    let mut tree = MoveTree::from_serialized(data).unwrap();
    let id = tree
        .add_move(Stone::new(0, 0, Color::Black), Vec::new())
        .id()
        .clone();
    assert_eq!(id.as_str(), (MAX_MOVE_NUMBER + 1).to_string());
    assert_eq!(tree.pointer().total_move_number, MAX_MOVE_NUMBER + 1);
}
