//! Move generation and validation.

use crate::error::MoveError;
use crate::types::{Board, Cell, Move, MovementRule, Side};
use tracing::{instrument, trace};

/// Enumerates every legal move for `side`.
///
/// The list is duplicate-free and ordered row-major by source cell, then
/// row-major by destination cell. AI tie-breaks depend on this order.
#[instrument(level = "trace", skip(board), fields(board = %board))]
pub fn legal_moves(board: &Board, side: Side, rule: MovementRule) -> Vec<Move> {
    let mut moves = Vec::new();
    for from in board.pieces(side) {
        for to in board.empties() {
            if rule.reaches(from, to) {
                moves.push(Move::new(from, to));
            }
        }
    }
    trace!(count = moves.len(), "Generated legal moves");
    moves
}

/// Checks a move against the board without regard to whose turn it is.
///
/// Returns the mover, i.e. the owner of the source piece.
pub fn validate(board: &Board, mv: Move, rule: MovementRule) -> Result<Side, MoveError> {
    let owner = board
        .get(mv.from)
        .owner
        .ok_or(MoveError::EmptySource(mv.from))?;
    if !board.get(mv.to).is_empty() {
        return Err(MoveError::DestinationOccupied(mv.to));
    }
    if !rule.reaches(mv.from, mv.to) {
        return Err(MoveError::Unreachable {
            from: mv.from,
            to: mv.to,
            rule,
        });
    }
    Ok(owner)
}

/// True when `mv` is a legal move for `side`.
pub fn is_legal(board: &Board, side: Side, mv: Move, rule: MovementRule) -> bool {
    matches!(validate(board, mv, rule), Ok(owner) if owner == side)
}

impl Board {
    /// Returns a new board with `mv` played by the owner of its source piece.
    ///
    /// The vacated cell becomes empty and unmoved; the destination takes the
    /// mover's piece flagged as moved. The input board is never touched.
    ///
    /// # Errors
    ///
    /// Any [`MoveError`] describing why the move is illegal.
    #[instrument(level = "debug", skip(self), fields(board = %self, mv = %mv))]
    pub fn apply(&self, mv: Move, rule: MovementRule) -> Result<Board, MoveError> {
        let mover = validate(self, mv, rule)?;
        let mut next = *self;
        next.set(mv.from, Cell::EMPTY);
        next.set(mv.to, Cell::moved(mover));
        Ok(next)
    }

    /// Like [`Board::apply`] but additionally requires `side` to own the
    /// source piece.
    ///
    /// # Errors
    ///
    /// [`MoveError::NotYourPiece`] when the source belongs to the opponent,
    /// otherwise whatever [`Board::apply`] reports.
    pub fn apply_for(&self, side: Side, mv: Move, rule: MovementRule) -> Result<Board, MoveError> {
        if let Some(owner) = self.get(mv.from).owner
            && owner != side
        {
            return Err(MoveError::NotYourPiece {
                position: mv.from,
                owner,
            });
        }
        self.apply(mv, rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn pos(r: u8, c: u8) -> Position {
        Position::new(r, c).unwrap()
    }

    #[test]
    fn test_initial_adjacency_moves() {
        let moves = legal_moves(&Board::initial(), Side::P1, MovementRule::Adjacency);
        let expected: Vec<Move> = (0..3).map(|r| Move::new(pos(r, 2), pos(r, 1))).collect();
        assert_eq!(moves, expected);
    }

    #[test]
    fn test_initial_full_reach_moves_are_row_major() {
        let moves = legal_moves(&Board::initial(), Side::P2, MovementRule::FullReach);
        assert_eq!(moves.len(), 9);
        assert_eq!(moves[0], Move::new(pos(0, 0), pos(0, 1)));
        assert_eq!(moves[1], Move::new(pos(0, 0), pos(1, 1)));
        assert_eq!(moves[8], Move::new(pos(2, 0), pos(2, 1)));
    }

    #[test]
    fn test_apply_sets_moved_and_clears_source() {
        let board = Board::initial();
        let next = board
            .apply(Move::new(pos(0, 2), pos(0, 1)), MovementRule::Adjacency)
            .unwrap();
        assert_eq!(next.get(pos(0, 1)), Cell::moved(Side::P1));
        assert_eq!(next.get(pos(0, 2)), Cell::EMPTY);
        assert_eq!(board, Board::initial(), "input must be untouched");
    }

    #[test]
    fn test_apply_rejects_illegal() {
        let board = Board::initial();
        let rule = MovementRule::Adjacency;
        assert_eq!(
            board.apply(Move::new(pos(0, 1), pos(1, 1)), rule),
            Err(MoveError::EmptySource(pos(0, 1)))
        );
        assert_eq!(
            board.apply(Move::new(pos(0, 2), pos(1, 2)), rule),
            Err(MoveError::DestinationOccupied(pos(1, 2)))
        );
        assert!(matches!(
            board.apply(Move::new(pos(0, 2), pos(1, 1)), rule),
            Err(MoveError::Unreachable { .. })
        ));
        assert!(board.apply(Move::new(pos(0, 2), pos(1, 1)), MovementRule::FullReach).is_ok());
    }

    #[test]
    fn test_apply_for_checks_owner() {
        let board = Board::initial();
        let result = board.apply_for(Side::P1, Move::new(pos(0, 0), pos(0, 1)), MovementRule::Adjacency);
        assert_eq!(
            result,
            Err(MoveError::NotYourPiece {
                position: pos(0, 0),
                owner: Side::P2
            })
        );
    }
}
