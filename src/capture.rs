//! Move legality and capture resolution.
//!
//! Every check works on a private copy of the caller's board, so the same
//! `(stone, board)` pair always gives the same answer.

use crate::board::{Board, Color, Point, Stone};
use crate::constants::N;
use crate::group::{Group, find_group, find_groups};

/// Why a candidate stone cannot be placed.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("Illegal move: point is off the board")]
    OffBoard,
    #[error("Illegal move: point not EMPTY")]
    Occupied,
    #[error("Illegal move: a stone must be black or white")]
    NoColor,
    #[error("Illegal move: suicide")]
    Suicide,
}

/// Decides what a placement captures and whether it is legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureService {
    board_size: usize,
}

impl Default for CaptureService {
    fn default() -> Self {
        Self::new(N)
    }
}

impl CaptureService {
    /// Rules for a `board_size`x`board_size` board.
    pub fn new(board_size: usize) -> Self {
        Self { board_size }
    }

    /// Side length of the boards this service judges.
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    fn on_board(&self, point: Point, board: &Board) -> bool {
        let limit = self.board_size.min(board.size()) as i32;
        (0..limit).contains(&point.x) && (0..limit).contains(&point.y)
    }

    /// Enemy groups removed by playing `stone`.
    ///
    /// Off-board and colorless stones capture nothing.
    pub fn captured_groups(&self, stone: &Stone, board: &Board) -> Vec<Group> {
        let point = stone.point();
        if !stone.color.is_stone() || !self.on_board(point, board) {
            return Vec::new();
        }
        let mut moved = board.clone();
        moved.set(point, stone.color);

        let seeds: Vec<Point> = moved.neighbors(point).collect();
        find_groups(&moved, &seeds, stone.color.opposite())
            .into_iter()
            .filter(Group::is_captured)
            .collect()
    }

    /// Whether `stone` would leave its own group without liberties.
    ///
    /// A move that captures is never suicide: the captured stones free up
    /// liberties before the placed group is judged.
    pub fn is_suicide(&self, stone: &Stone, board: &Board) -> bool {
        let point = stone.point();
        if !stone.color.is_stone() || !self.on_board(point, board) {
            return false;
        }
        if !self.captured_groups(stone, board).is_empty() {
            return false;
        }
        let mut moved = board.clone();
        moved.set(point, stone.color);
        find_group(&moved, point).is_some_and(|group| group.is_captured())
    }

    /// Check a candidate placement, naming the first rule it breaks.
    pub fn check_move(&self, stone: &Stone, board: &Board) -> Result<(), MoveError> {
        let point = stone.point();
        if !self.on_board(point, board) {
            return Err(MoveError::OffBoard);
        }
        if board.get(point) != Some(Color::Empty) {
            return Err(MoveError::Occupied);
        }
        if !stone.color.is_stone() {
            return Err(MoveError::NoColor);
        }
        if self.is_suicide(stone, board) {
            return Err(MoveError::Suicide);
        }
        Ok(())
    }

    /// `None` stands for "no candidate" (e.g. the cursor is off the board)
    /// and is never legal.
    pub fn is_legal_move(&self, stone: Option<&Stone>, board: &Board) -> bool {
        stone.is_some_and(|s| self.check_move(s, board).is_ok())
    }
}
