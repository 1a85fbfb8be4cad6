//! Board geometry: points, colors, stones and the 2D color grid.
//!
//! The board is addressed by `(x, y)` with `(0, 0)` in the top-left corner.
//! Cells are stored row-major, so the cell for `(x, y)` lives at
//! `y * size + x`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::N;
use crate::error::InvalidColor;

/// Color of an intersection, or of the stone a move places.
///
/// `Empty` doubles as the placeholder color of the root node. On the wire
/// colors are small integers: `Empty = 0`, `Black = 1`, `White = 2`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Color {
    #[default]
    Empty,
    Black,
    White,
}

impl Color {
    /// The other player's color. `Empty` has no opponent and maps to itself.
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Empty => Color::Empty,
        }
    }

    pub fn is_stone(self) -> bool {
        self != Color::Empty
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> u8 {
        match color {
            Color::Empty => 0,
            Color::Black => 1,
            Color::White => 2,
        }
    }
}

impl TryFrom<u8> for Color {
    type Error = InvalidColor;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Color::Empty),
            1 => Ok(Color::Black),
            2 => Ok(Color::White),
            other => Err(InvalidColor(other)),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Empty => write!(f, "empty"),
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// An intersection. Coordinates are signed so the root node can carry
/// `(-1, -1)` for "no stone".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A candidate or recorded stone placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stone {
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

impl Stone {
    pub const fn new(x: i32, y: i32, color: Color) -> Self {
        Self { x, y, color }
    }

    pub const fn at(point: Point, color: Color) -> Self {
        Self::new(point.x, point.y, color)
    }

    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A square grid of colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Color>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(N)
    }
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Color::Empty; size * size],
        }
    }

    /// Build a board from text rows: `X` black, `O` white, anything else empty.
    /// The board size is the number of rows; short rows are padded with empty
    /// points and long rows are cut.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut board = Board::new(rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().take(board.size).enumerate() {
                let color = match ch {
                    'X' => Color::Black,
                    'O' => Color::White,
                    _ => Color::Empty,
                };
                board.cells[y * board.size + x] = color;
            }
        }
        board
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `point` lies on the board.
    pub fn contains(&self, point: Point) -> bool {
        self.idx(point).is_some()
    }

    fn idx(&self, point: Point) -> Option<usize> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(y * self.size + x)
    }

    /// Color at `point`, or `None` off the board.
    pub fn get(&self, point: Point) -> Option<Color> {
        self.idx(point).map(|i| self.cells[i])
    }

    /// Set the color at `point`. Returns `false` (and changes nothing) when the
    /// point is off the board.
    pub fn set(&mut self, point: Point, color: Color) -> bool {
        match self.idx(point) {
            Some(i) => {
                self.cells[i] = color;
                true
            }
            None => false,
        }
    }

    /// Orthogonal neighbors of `point` that lie on the board, in the order
    /// up, down, left, right. Corners have 2, edges 3, inner points 4.
    pub fn neighbors(&self, point: Point) -> impl Iterator<Item = Point> + use<> {
        let s = self.size as i32;
        let Point { x, y } = point;
        let mut v = Vec::with_capacity(4);
        if self.contains(point) {
            if y > 0 {
                v.push(Point::new(x, y - 1));
            }
            if y + 1 < s {
                v.push(Point::new(x, y + 1));
            }
            if x > 0 {
                v.push(Point::new(x - 1, y));
            }
            if x + 1 < s {
                v.push(Point::new(x + 1, y));
            }
        }
        v.into_iter()
    }

    /// Number of stones of `color` on the board.
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|&&c| c == color).count()
    }

    /// All on-board points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let s = self.size as i32;
        (0..s).flat_map(move |y| (0..s).map(move |x| Point::new(x, y)))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = match self.cells[y * self.size + x] {
                    Color::Black => 'X',
                    Color::White => 'O',
                    Color::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
