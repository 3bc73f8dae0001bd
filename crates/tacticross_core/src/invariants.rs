//! First-class board invariants.
//!
//! Invariants are logical properties that must hold for every reachable
//! board. They are testable independently and the orchestrator re-checks them
//! after each applied move.

use crate::position::Position;
use crate::rules::LINES;
use crate::types::{Board, Side};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(held, _)| !held)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Each side keeps exactly three pieces.
pub struct PieceCountInvariant;

impl Invariant<Board> for PieceCountInvariant {
    fn holds(board: &Board) -> bool {
        board.count(Side::P1) == 3 && board.count(Side::P2) == 3
    }

    fn description() -> &'static str {
        "Each side owns exactly three pieces"
    }
}

/// The moved flag never sits on an empty cell.
pub struct MovedImpliesOwnedInvariant;

impl Invariant<Board> for MovedImpliesOwnedInvariant {
    fn holds(board: &Board) -> bool {
        Position::ALL.iter().all(|p| {
            let cell = board.get(*p);
            !cell.moved || cell.owner.is_some()
        })
    }

    fn description() -> &'static str {
        "Empty cells carry no moved flag"
    }
}

/// At most one side holds a completed line.
pub struct SingleWinnerInvariant;

impl Invariant<Board> for SingleWinnerInvariant {
    fn holds(board: &Board) -> bool {
        let completes = |side: Side| {
            LINES
                .iter()
                .any(|line| line.iter().all(|p| board.get(*p).is_moved_by(side)))
        };
        !(completes(Side::P1) && completes(Side::P2))
    }

    fn description() -> &'static str {
        "At most one side holds a winning line"
    }
}

/// Every board invariant as a composable set.
pub type BoardInvariants = (
    PieceCountInvariant,
    MovedImpliesOwnedInvariant,
    SingleWinnerInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    #[test]
    fn test_initial_board_holds() {
        assert!(BoardInvariants::check_all(&Board::initial()).is_ok());
    }

    #[test]
    fn test_detects_stray_moved_flag() {
        let mut board = Board::initial();
        board.set(
            Position::CENTER,
            Cell {
                owner: None,
                moved: true,
            },
        );
        let violations = BoardInvariants::check_all(&board).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].description,
            MovedImpliesOwnedInvariant::description()
        );
    }

    #[test]
    fn test_detects_extra_piece() {
        let board = Board::initial().with(Position::CENTER, Cell::unmoved(Side::P1));
        assert!(!PieceCountInvariant::holds(&board));
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (PieceCountInvariant, SingleWinnerInvariant);
        assert!(TwoInvariants::check_all(&Board::initial()).is_ok());
    }

    #[test]
    fn test_dual_winners_detected() {
        let board = Board::parse("1* 1* 1*  . . .  2* 2* 2*").unwrap();
        assert!(!SingleWinnerInvariant::holds(&board));
    }
}
