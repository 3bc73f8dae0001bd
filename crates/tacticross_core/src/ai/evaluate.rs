//! Static evaluation and move ordering shared by the search strategies.

use crate::position::{Position, Zone};
use crate::rules::{LINES, creates_threat, legal_moves, threat_lines, winner};
use crate::types::{Board, Move, MovementRule, Side};

/// Two moved pieces plus one empty cell in a line.
const THREAT_WEIGHT: i32 = 50;
/// The opponent's threats weigh more than our own.
const OPPONENT_THREAT_WEIGHT: i32 = 60;
/// One moved piece plus two empty cells in a line.
const SEED_WEIGHT: i32 = 5;
/// Every piece that has left its starting cell.
const MOVED_WEIGHT: i32 = 2;

/// Positional bonus for occupying a cell.
pub fn zone_bonus(pos: Position) -> i32 {
    match pos.zone() {
        Zone::Center => 3,
        Zone::Corner => 2,
        Zone::Edge => 1,
    }
}

fn side_score(board: &Board, side: Side, threat_weight: i32) -> i32 {
    let mut score = 0;
    for line in LINES.iter() {
        let moved = line.iter().filter(|p| board.get(**p).is_moved_by(side)).count();
        let empty = line.iter().filter(|p| board.get(**p).is_empty()).count();
        score += match (moved, empty) {
            (2, 1) => threat_weight,
            (1, 2) => SEED_WEIGHT,
            _ => 0,
        };
    }
    for pos in board.pieces(side) {
        score += zone_bonus(pos);
        if board.get(pos).moved {
            score += MOVED_WEIGHT;
        }
    }
    score
}

/// Scores a non-terminal board from `side`'s point of view.
pub fn evaluate(board: &Board, side: Side) -> i32 {
    side_score(board, side, THREAT_WEIGHT) - side_score(board, side.opponent(), OPPONENT_THREAT_WEIGHT)
}

/// Quick priority for ordering candidate moves; higher searches first.
pub fn move_priority(board: &Board, side: Side, mv: Move, rule: MovementRule) -> i32 {
    let Ok(after) = board.apply(mv, rule) else {
        return i32::MIN;
    };
    if winner(&after) == Some(side) {
        return 10_000;
    }
    let mut priority = 10 * zone_bonus(mv.to);
    if threat_lines(board, side.opponent()).any(|line| line.contains(&mv.to)) {
        priority += 500;
    }
    if creates_threat(&after, side, mv.to) {
        priority += 200;
    }
    if !board.get(mv.from).moved {
        priority += 5;
    }
    priority
}

/// Legal moves sorted by descending priority, each paired with its index in
/// the canonical move order.
///
/// With `per_piece_cap`, only the best `cap` moves of each source piece
/// survive. The sort is stable, so equal priorities keep canonical order.
pub fn ordered_moves(
    board: &Board,
    side: Side,
    rule: MovementRule,
    per_piece_cap: Option<usize>,
) -> Vec<(usize, Move)> {
    let mut scored: Vec<(i32, usize, Move)> = legal_moves(board, side, rule)
        .into_iter()
        .enumerate()
        .map(|(idx, mv)| (move_priority(board, side, mv, rule), idx, mv))
        .collect();

    if let Some(cap) = per_piece_cap {
        let mut kept = Vec::with_capacity(scored.len());
        for from in board.pieces(side) {
            let mut own: Vec<_> = scored.iter().copied().filter(|(_, _, mv)| mv.from == from).collect();
            own.sort_by(|a, b| b.0.cmp(&a.0));
            kept.extend(own.into_iter().take(cap));
        }
        scored = kept;
    }

    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, idx, mv)| (idx, mv)).collect()
}
