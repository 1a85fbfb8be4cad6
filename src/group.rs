//! Connected stone groups and their liberties.
//!
//! Groups are found by breadth-first flood fill over 4-adjacent stones of one
//! color. Nothing here mutates the board it is given.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Point};

/// A maximal set of connected same-colored stones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Stones in the order the flood fill reached them.
    pub stones: Vec<Point>,
    /// Empty points adjacent to any stone, each listed once.
    pub liberties: Vec<Point>,
    pub color: Color,
}

impl Group {
    pub fn is_captured(&self) -> bool {
        self.liberties.is_empty()
    }

    pub fn contains(&self, point: Point) -> bool {
        self.stones.contains(&point)
    }
}

/// Find the group containing the stone at `start`.
///
/// Returns `None` when `start` is empty or off the board.
pub fn find_group(board: &Board, start: Point) -> Option<Group> {
    match board.get(start) {
        Some(color) if color.is_stone() => Some(flood_fill(board, start, color)),
        _ => None,
    }
}

/// Find every group of `color` that touches one of `seeds`.
///
/// Seeds that are off the board or hold another color are ignored, and a
/// seed already swallowed by an earlier group is not searched again, so each
/// connected component appears once, in the order its first seed was given.
pub fn find_groups(board: &Board, seeds: &[Point], color: Color) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut processed: HashSet<Point> = HashSet::new();

    for &seed in seeds {
        if processed.contains(&seed) || board.get(seed) != Some(color) {
            continue;
        }
        let group = flood_fill(board, seed, color);
        processed.extend(group.stones.iter().copied());
        groups.push(group);
    }
    groups
}

fn flood_fill(board: &Board, start: Point, color: Color) -> Group {
    let mut stones = Vec::new();
    let mut liberties = Vec::new();
    let mut seen_liberties: HashSet<Point> = HashSet::new();
    let mut visited: HashSet<Point> = HashSet::new();
    let mut queue = VecDeque::from([start]);

    while let Some(pt) = queue.pop_front() {
        if !visited.insert(pt) {
            continue;
        }
        if board.get(pt) != Some(color) {
            continue;
        }
        stones.push(pt);
        for n in board.neighbors(pt) {
            match board.get(n) {
                Some(Color::Empty) => {
                    if seen_liberties.insert(n) {
                        liberties.push(n);
                    }
                }
                Some(c) if c == color && !visited.contains(&n) => queue.push_back(n),
                _ => {}
            }
        }
    }

    Group {
        stones,
        liberties,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_stone_liberties() {
        let board = Board::from_rows(&["...", ".X.", "..."]);
        let group = find_group(&board, Point::new(1, 1)).unwrap();
        assert_eq!(group.stones, vec![Point::new(1, 1)]);
        assert_eq!(group.liberties.len(), 4);
        assert_eq!(group.color, Color::Black);
    }

    #[test]
    fn test_liberties_are_deduplicated() {
        // Both stones touch (1,0); it must be counted once.
        let board = Board::from_rows(&["X..", "XX.", "..."]);
        let group = find_group(&board, Point::new(0, 0)).unwrap();
        assert_eq!(group.stones.len(), 3);
        let mut libs = group.liberties.clone();
        libs.sort();
        assert_eq!(
            libs,
            vec![
                Point::new(0, 2),
                Point::new(1, 0),
                Point::new(1, 2),
                Point::new(2, 1)
            ]
        );
    }

    #[test]
    fn test_empty_or_off_board_start() {
        let board = Board::from_rows(&["...", "...", "..."]);
        assert!(find_group(&board, Point::new(1, 1)).is_none());
        assert!(find_group(&board, Point::new(3, 1)).is_none());
    }

    #[test]
    fn test_find_groups_merges_shared_component() {
        // The white stones above and left of (1,1) are one group.
        let board = Board::from_rows(&["OO.", "O..", "..."]);
        let seeds = [Point::new(1, 0), Point::new(0, 1), Point::new(2, 1)];
        let groups = find_groups(&board, &seeds, Color::White);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].stones.len(), 3);
    }

    #[test]
    fn test_find_groups_ignores_other_colors() {
        let board = Board::from_rows(&[".X.", "O.O", ".X."]);
        let seeds = [
            Point::new(1, 0),
            Point::new(1, 2),
            Point::new(0, 1),
            Point::new(2, 1),
        ];
        let groups = find_groups(&board, &seeds, Color::White);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.color == Color::White));
        assert!(groups.iter().all(|g| g.stones.len() == 1));
    }

    #[test]
    fn test_group_without_liberties() {
        let board = Board::from_rows(&["OX.", "X..", "..."]);
        let group = find_group(&board, Point::new(0, 0)).unwrap();
        assert!(group.is_captured());
        assert!(group.contains(Point::new(0, 0)));
    }
}
