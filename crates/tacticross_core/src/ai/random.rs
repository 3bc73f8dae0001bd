//! Uniform random move selection.

use super::{Strategy, StrategyKind};
use crate::rules::legal_moves;
use crate::types::{Board, Move, MovementRule, Side};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

/// Picks uniformly among the legal moves.
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    rule: MovementRule,
    rng: SmallRng,
}

impl RandomStrategy {
    /// Creates a random strategy seeded from entropy.
    pub fn new(rule: MovementRule) -> Self {
        Self {
            rule,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Creates a reproducible random strategy.
    pub fn with_seed(rule: MovementRule, seed: u64) -> Self {
        Self {
            rule,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Picks one of `moves`, or `None` when the slice is empty.
    pub fn pick(&mut self, moves: &[Move]) -> Option<Move> {
        moves.choose(&mut self.rng).copied()
    }
}

impl Strategy for RandomStrategy {
    #[instrument(skip(self, board), fields(board = %board))]
    fn choose(&mut self, board: &Board, side: Side) -> Option<Move> {
        let moves = legal_moves(board, side, self.rule);
        let choice = self.pick(&moves);
        debug!(candidates = moves.len(), choice = ?choice, "Random pick");
        choice
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Random
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_visits_every_move() {
        // Adjacency from the initial layout leaves exactly three moves.
        let board = Board::initial();
        let mut strategy = RandomStrategy::with_seed(MovementRule::Adjacency, 7);
        let mut seen: HashMap<Move, usize> = HashMap::new();
        for _ in 0..1000 {
            let mv = strategy.choose(&board, Side::P1).unwrap();
            *seen.entry(mv).or_default() += 1;
        }
        assert_eq!(seen.len(), 3);
        assert!(seen.values().all(|n| *n > 0));
    }

    #[test]
    fn test_same_seed_same_choices() {
        let board = Board::initial();
        let mut a = RandomStrategy::with_seed(MovementRule::FullReach, 42);
        let mut b = RandomStrategy::with_seed(MovementRule::FullReach, 42);
        for _ in 0..20 {
            assert_eq!(a.choose(&board, Side::P2), b.choose(&board, Side::P2));
        }
    }

    #[test]
    fn test_no_moves_returns_none() {
        let mut strategy = RandomStrategy::with_seed(MovementRule::Adjacency, 1);
        assert_eq!(strategy.choose(&Board::empty(), Side::P1), None);
    }
}
