//! AI opponents.
//!
//! Every strategy reads a board snapshot and proposes a move for one side
//! without touching shared state. Difficulty selects the strategy:
//!
//! | Difficulty | Strategy  |
//! |------------|-----------|
//! | easy       | random    |
//! | medium     | greedy    |
//! | hard       | minimax   |

pub mod evaluate;
pub mod greedy;
pub mod minimax;
pub mod random;

pub use greedy::{GreedyReason, GreedyStrategy};
pub use minimax::{MinimaxConfig, MinimaxStrategy, SearchReport};
pub use random::RandomStrategy;

use crate::types::{Board, Difficulty, Move, MovementRule, Side};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A local move source.
pub trait Strategy {
    /// Proposes a move for `side`, or `None` when no legal move exists.
    fn choose(&mut self, board: &Board, side: Side) -> Option<Move>;

    /// Which family this strategy belongs to.
    fn kind(&self) -> StrategyKind;
}

/// Strategy family.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StrategyKind {
    /// Uniform random.
    Random,
    /// Priority heuristic.
    Greedy,
    /// Alpha-beta search.
    Minimax,
}

impl StrategyKind {
    /// Strategy family used at `difficulty`.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => StrategyKind::Random,
            Difficulty::Medium => StrategyKind::Greedy,
            Difficulty::Hard => StrategyKind::Minimax,
        }
    }
}

/// Builds the local strategy for `difficulty`.
///
/// `seed` makes the random parts reproducible; greedy and minimax are
/// deterministic apart from greedy's last-resort pick.
#[instrument]
pub fn strategy_for(
    difficulty: Difficulty,
    rule: MovementRule,
    seed: Option<u64>,
) -> Box<dyn Strategy + Send> {
    match StrategyKind::for_difficulty(difficulty) {
        StrategyKind::Random => Box::new(match seed {
            Some(seed) => RandomStrategy::with_seed(rule, seed),
            None => RandomStrategy::new(rule),
        }),
        StrategyKind::Greedy => Box::new(GreedyStrategy::new(rule, seed)),
        StrategyKind::Minimax => Box::new(MinimaxStrategy::new(rule)),
    }
}

/// Like [`strategy_for`] but with an explicit search depth for minimax.
pub fn strategy_with_depth(
    difficulty: Difficulty,
    rule: MovementRule,
    seed: Option<u64>,
    depth: u8,
) -> Box<dyn Strategy + Send> {
    match StrategyKind::for_difficulty(difficulty) {
        StrategyKind::Minimax => Box::new(MinimaxStrategy::with_config(
            rule,
            MinimaxConfig::for_rule(rule).with_depth(depth),
        )),
        _ => strategy_for(difficulty, rule, seed),
    }
}
