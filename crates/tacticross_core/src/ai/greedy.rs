//! Priority-ordered heuristic play.
//!
//! The greedy strategy walks a fixed list of priorities and plays the first
//! move satisfying the highest one that applies:
//!
//! 1. **Block** - if the opponent could complete a line next turn, play a
//!    move after which no opponent reply wins (an immediate win of our own
//!    also qualifies and is preferred).
//! 2. **Win** - complete a line now.
//! 3. **Build** - create a line with two moved pieces and one empty cell.
//! 4. **Positional** - center, then corners, then edges.
//! 5. **Fallback** - a random legal move.
//!
//! Steps 3 and 4 only consider moves that leave the opponent without an
//! immediate win. When every move loses, step 5 picks one at random.
//! Ties always go to the earliest move in canonical order.

use super::random::RandomStrategy;
use super::{Strategy, StrategyKind};
use crate::rules::{creates_threat, legal_moves, winner, winning_moves};
use crate::types::{Board, Move, MovementRule, Side};
use tracing::{debug, instrument};

/// Which priority produced the greedy choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum GreedyReason {
    /// Neutralised an opponent threat.
    Block,
    /// Completed a line.
    Win,
    /// Created a two-moved-plus-empty line.
    Build,
    /// Best cell by zone.
    Positional,
    /// Nothing safe was available.
    Fallback,
}

/// Deterministic heuristic strategy.
#[derive(Debug, Clone)]
pub struct GreedyStrategy {
    rule: MovementRule,
    fallback: RandomStrategy,
}

impl GreedyStrategy {
    /// Creates a greedy strategy; the seed only drives the last-resort pick.
    pub fn new(rule: MovementRule, seed: Option<u64>) -> Self {
        let fallback = match seed {
            Some(seed) => RandomStrategy::with_seed(rule, seed),
            None => RandomStrategy::new(rule),
        };
        Self { rule, fallback }
    }

    fn wins(&self, board: &Board, side: Side, mv: Move) -> bool {
        board
            .apply(mv, self.rule)
            .is_ok_and(|after| winner(&after) == Some(side))
    }

    /// True when after `mv` the opponent has no winning reply.
    fn is_safe(&self, board: &Board, side: Side, mv: Move) -> bool {
        match board.apply(mv, self.rule) {
            Ok(after) if winner(&after) == Some(side) => true,
            Ok(after) => winning_moves(&after, side.opponent(), self.rule).is_empty(),
            Err(_) => false,
        }
    }

    /// Chooses a move and reports which priority produced it.
    #[instrument(skip(self, board), fields(board = %board))]
    pub fn decide(&mut self, board: &Board, side: Side) -> Option<(Move, GreedyReason)> {
        let moves = legal_moves(board, side, self.rule);
        if moves.is_empty() {
            return None;
        }

        let safe: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|mv| self.is_safe(board, side, *mv))
            .collect();

        if !winning_moves(board, side.opponent(), self.rule).is_empty() {
            let block = safe
                .iter()
                .copied()
                .find(|mv| self.wins(board, side, *mv))
                .or_else(|| safe.first().copied());
            if let Some(mv) = block {
                return Some((mv, GreedyReason::Block));
            }
            debug!("No move neutralises every opponent threat");
        }

        if let Some(mv) = moves.iter().copied().find(|mv| self.wins(board, side, *mv)) {
            return Some((mv, GreedyReason::Win));
        }

        let builds = safe.iter().copied().find(|mv| {
            board
                .apply(*mv, self.rule)
                .is_ok_and(|after| creates_threat(&after, side, mv.to))
        });
        if let Some(mv) = builds {
            return Some((mv, GreedyReason::Build));
        }

        if let Some(mv) = safe.iter().copied().min_by_key(|mv| mv.to.zone()) {
            return Some((mv, GreedyReason::Positional));
        }

        self.fallback.pick(&moves).map(|mv| (mv, GreedyReason::Fallback))
    }
}

impl Strategy for GreedyStrategy {
    fn choose(&mut self, board: &Board, side: Side) -> Option<Move> {
        let decision = self.decide(board, side);
        if let Some((mv, reason)) = decision {
            debug!(mv = %mv, %reason, "Greedy choice");
        }
        decision.map(|(mv, _)| mv)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Greedy
    }
}
