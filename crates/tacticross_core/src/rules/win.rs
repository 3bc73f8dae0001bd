//! Win detection with the moved qualifier.

use super::movement::legal_moves;
use crate::position::Position;
use crate::types::{Board, Move, MovementRule, Side};
use tracing::instrument;

const P: [Position; 9] = Position::ALL;

/// The eight winning lines: rows top to bottom, columns left to right, then
/// the top-left and top-right diagonals.
pub static LINES: [[Position; 3]; 8] = [
    // Rows
    [P[0], P[1], P[2]],
    [P[3], P[4], P[5]],
    [P[6], P[7], P[8]],
    // Columns
    [P[0], P[3], P[6]],
    [P[1], P[4], P[7]],
    [P[2], P[5], P[8]],
    // Diagonals
    [P[0], P[4], P[8]],
    [P[2], P[4], P[6]],
];

/// Returns the side holding a completed line, if any.
///
/// A line counts only when all three cells are owned by the same side and
/// every one of those pieces has moved. Lines are checked in [`LINES`] order
/// and the first hit wins.
#[instrument(level = "trace", skip(board), fields(board = %board))]
pub fn winner(board: &Board) -> Option<Side> {
    LINES.iter().find_map(|line| {
        let side = board.get(line[0]).owner?;
        line.iter()
            .all(|p| board.get(*p).is_moved_by(side))
            .then_some(side)
    })
}

/// Lines holding two moved pieces of `side` and one empty cell.
pub fn threat_lines(board: &Board, side: Side) -> impl Iterator<Item = &'static [Position; 3]> + '_ {
    LINES.iter().filter(move |line| {
        let moved = line.iter().filter(|p| board.get(**p).is_moved_by(side)).count();
        let empty = line.iter().filter(|p| board.get(**p).is_empty()).count();
        moved == 2 && empty == 1
    })
}

/// True when `after` has a threat line for `side` running through `to`.
pub fn creates_threat(after: &Board, side: Side, to: Position) -> bool {
    threat_lines(after, side).any(|line| line.contains(&to))
}

/// Moves that win on the spot for `side`, in canonical order.
pub fn winning_moves(board: &Board, side: Side, rule: MovementRule) -> Vec<Move> {
    legal_moves(board, side, rule)
        .into_iter()
        .filter(|mv| {
            board
                .apply(*mv, rule)
                .is_ok_and(|next| winner(&next) == Some(side))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(grid: &str) -> Board {
        Board::parse(grid).unwrap()
    }

    #[test]
    fn test_no_winner_initial() {
        assert_eq!(winner(&Board::initial()), None);
    }

    #[test]
    fn test_unmoved_column_does_not_win() {
        // Column 0 is fully owned by P2 from the start but never moved.
        let b = board("2 . 1  2 . 1  2 . 1");
        assert_eq!(winner(&b), None);
    }

    #[test]
    fn test_moved_row_wins() {
        let b = board("1* 1* 1*  2 . .  2 2* .");
        assert_eq!(winner(&b), Some(Side::P1));
    }

    #[test]
    fn test_partially_moved_line_does_not_win() {
        let b = board("1* 1 1*  2 . .  2 2* .");
        assert_eq!(winner(&b), None);
    }

    #[test]
    fn test_diagonal_wins() {
        let b = board(". 1 2*  1 2* .  2* 1 .");
        assert_eq!(winner(&b), Some(Side::P2));
    }

    #[test]
    fn test_threat_lines() {
        let b = board("1* 1* .  2 . 1  2 . 2");
        let threats: Vec<_> = threat_lines(&b, Side::P1).collect();
        assert_eq!(threats, vec![&LINES[0]]);
        assert_eq!(threat_lines(&b, Side::P2).count(), 0);
    }

    #[test]
    fn test_winning_moves_respect_rule() {
        let b = board("1* 1* .  2 . 1  2 . 2");
        let adj = winning_moves(&b, Side::P1, MovementRule::Adjacency);
        assert_eq!(
            adj,
            vec![Move::new(Position::new(1, 2).unwrap(), Position::new(0, 2).unwrap())]
        );
        assert_eq!(winning_moves(&b, Side::P2, MovementRule::FullReach), vec![]);
    }
}
