//! Core domain types: sides, cells, the board and moves.

use crate::position::{Position, SIZE};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two competing sides.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    /// Player one (always opens a round).
    P1,
    /// Player two.
    P2,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }
}

/// Destination reachability rule for a move.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MovementRule {
    /// A piece steps to one of its four orthogonal neighbours.
    #[default]
    Adjacency,
    /// A piece may jump to any empty cell.
    FullReach,
}

impl MovementRule {
    /// True when a piece on `from` may travel to `to` under this rule,
    /// ignoring occupancy.
    pub fn reaches(self, from: Position, to: Position) -> bool {
        match self {
            MovementRule::Adjacency => from.is_orthogonal_neighbor(to),
            MovementRule::FullReach => from != to,
        }
    }
}

/// AI difficulty level.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Random moves.
    Easy,
    /// Greedy heuristic.
    #[default]
    Medium,
    /// Alpha-beta search.
    Hard,
}

/// Visual theme of a map. Carried for the survival layer's map rotation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MapTheme {
    /// Lava realm.
    #[default]
    Lava,
    /// River valley.
    River,
    /// Polar wastes.
    Polar,
}

/// A single board cell.
///
/// `owner` is `None` iff the cell is unoccupied. `moved` is set when the
/// occupying piece arrived as a move destination and is always false on an
/// empty cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Owning side, if occupied.
    pub owner: Option<Side>,
    /// Whether the occupying piece got here by moving.
    pub moved: bool,
}

impl Cell {
    /// An unoccupied cell.
    pub const EMPTY: Cell = Cell {
        owner: None,
        moved: false,
    };

    /// A piece still on its starting cell.
    pub fn unmoved(side: Side) -> Self {
        Self {
            owner: Some(side),
            moved: false,
        }
    }

    /// A piece that arrived by moving.
    pub fn moved(side: Side) -> Self {
        Self {
            owner: Some(side),
            moved: true,
        }
    }

    /// True when no piece sits here.
    pub fn is_empty(self) -> bool {
        self.owner.is_none()
    }

    /// True when `side` owns a moved piece here.
    pub fn is_moved_by(self, side: Side) -> bool {
        self.owner == Some(side) && self.moved
    }

    /// Compact token: `.` empty, `1`/`2` unmoved, `1*`/`2*` moved.
    pub fn token(self) -> &'static str {
        match (self.owner, self.moved) {
            (None, _) => ".",
            (Some(Side::P1), false) => "1",
            (Some(Side::P1), true) => "1*",
            (Some(Side::P2), false) => "2",
            (Some(Side::P2), true) => "2*",
        }
    }

    /// Parses a token produced by [`Cell::token`].
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "." => Some(Cell::EMPTY),
            "1" => Some(Cell::unmoved(Side::P1)),
            "1*" => Some(Cell::moved(Side::P1)),
            "2" => Some(Cell::unmoved(Side::P2)),
            "2*" => Some(Cell::moved(Side::P2)),
            _ => None,
        }
    }
}

/// The 3x3 board, rows top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; SIZE as usize]; SIZE as usize],
}

impl Board {
    /// Starting layout: P2 fills column 0, P1 fills column 2, column 1 empty.
    #[instrument]
    pub fn initial() -> Self {
        let row = [Cell::unmoved(Side::P2), Cell::EMPTY, Cell::unmoved(Side::P1)];
        Self { cells: [row; 3] }
    }

    /// A board with no pieces at all. Only useful for building positions.
    pub fn empty() -> Self {
        Self {
            cells: [[Cell::EMPTY; 3]; 3],
        }
    }

    /// Parses nine whitespace-separated [`Cell::token`]s in row-major order.
    pub fn parse(grid: &str) -> Option<Self> {
        let tokens: Vec<&str> = grid.split_whitespace().collect();
        if tokens.len() != Position::ALL.len() {
            return None;
        }
        let mut board = Self::empty();
        for (pos, token) in Position::ALL.iter().zip(tokens) {
            board.set(*pos, Cell::from_token(token)?);
        }
        Some(board)
    }

    /// Returns the cell at `pos`.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[usize::from(pos.row())][usize::from(pos.col())]
    }

    /// Overwrites the cell at `pos`. Bypasses every rule; use `apply` to play.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[usize::from(pos.row())][usize::from(pos.col())] = cell;
    }

    /// Builder form of [`Board::set`].
    pub fn with(mut self, pos: Position, cell: Cell) -> Self {
        self.set(pos, cell);
        self
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> &[[Cell; 3]; 3] {
        &self.cells
    }

    /// Positions occupied by `side`, row-major.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = Position> + '_ {
        Position::ALL
            .into_iter()
            .filter(move |p| self.get(*p).owner == Some(side))
    }

    /// Empty positions, row-major.
    pub fn empties(&self) -> impl Iterator<Item = Position> + '_ {
        Position::ALL.into_iter().filter(|p| self.get(*p).is_empty())
    }

    /// Number of pieces owned by `side`.
    pub fn count(&self, side: Side) -> usize {
        self.pieces(side).count()
    }

    /// Multi-line rendering with row and column labels.
    pub fn display(&self) -> String {
        let mut out = String::from("    0   1   2\n");
        for (r, row) in self.cells.iter().enumerate() {
            out.push_str(&format!("{r} "));
            for cell in row {
                out.push_str(&format!(" {:<3}", cell.token()));
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self
            .cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.token())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        write!(f, "{}", rows.join(" / "))
    }
}

/// Moving one piece from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Cell the piece leaves.
    pub from: Position,
    /// Cell the piece enters.
    pub to: Position,
}

impl Move {
    /// Creates a new move.
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// Parses `"r,c -> r,c"`, also accepting a bare space between the halves.
    pub fn parse(s: &str) -> Option<Self> {
        let (from, to) = match s.split_once("->") {
            Some(halves) => halves,
            None => s.trim().split_once(char::is_whitespace)?,
        };
        Some(Self::new(Position::parse(from)?, Position::parse(to)?))
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
