//! Cell coordinates on the 3x3 board.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Side length of the board.
pub const SIZE: u8 = 3;

/// A cell coordinate, row and column both in `0..3`.
///
/// Positions order row-major, which is the canonical order used by the
/// move generator and every AI tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    row: u8,
    col: u8,
}

impl TryFrom<RawPosition> for Position {
    type Error = String;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.row, raw.col)
            .ok_or_else(|| format!("position ({},{}) is off the board", raw.row, raw.col))
    }
}

/// Positional class of a cell, used by the heuristic strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Zone {
    /// The middle cell.
    Center,
    /// One of the four corner cells.
    Corner,
    /// One of the four edge midpoints.
    Edge,
}

impl Position {
    /// All nine positions in row-major order.
    pub const ALL: [Position; 9] = [
        Position { row: 0, col: 0 },
        Position { row: 0, col: 1 },
        Position { row: 0, col: 2 },
        Position { row: 1, col: 0 },
        Position { row: 1, col: 1 },
        Position { row: 1, col: 2 },
        Position { row: 2, col: 0 },
        Position { row: 2, col: 1 },
        Position { row: 2, col: 2 },
    ];

    /// The center cell.
    pub const CENTER: Position = Position { row: 1, col: 1 };

    /// Creates a position, returning `None` when out of bounds.
    #[instrument]
    pub fn new(row: u8, col: u8) -> Option<Self> {
        (row < SIZE && col < SIZE).then_some(Self { row, col })
    }

    /// Creates a position from a row-major index (0-8).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Row-major index (0-8).
    pub fn to_index(self) -> usize {
        usize::from(self.row) * usize::from(SIZE) + usize::from(self.col)
    }

    /// Row, 0 at the top.
    pub fn row(self) -> u8 {
        self.row
    }

    /// Column, 0 at the left.
    pub fn col(self) -> u8 {
        self.col
    }

    /// True when `other` shares an edge with this cell.
    pub fn is_orthogonal_neighbor(self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// Classifies the cell as center, corner or edge.
    pub fn zone(self) -> Zone {
        match (self.row, self.col) {
            (1, 1) => Zone::Center,
            (0 | 2, 0 | 2) => Zone::Corner,
            _ => Zone::Edge,
        }
    }

    /// Parses `"r,c"` (whitespace tolerated).
    pub fn parse(s: &str) -> Option<Self> {
        let (row, col) = s.trim().split_once(',')?;
        Self::new(row.trim().parse().ok()?, col.trim().parse().ok()?)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}
