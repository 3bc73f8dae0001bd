//! Depth-limited minimax with alpha-beta pruning.

use super::evaluate::{evaluate, ordered_moves};
use super::{Strategy, StrategyKind};
use crate::rules::winner;
use crate::types::{Board, Move, MovementRule, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Search parameters.
///
/// Terminal scores are `win_score - depth` for a win and
/// `depth - loss_score` for a loss, so faster wins and slower losses are
/// preferred. `loss_score` exceeds `win_score`: losing costs more than
/// winning earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimaxConfig {
    /// Maximum plies searched below the root.
    pub max_depth: u8,
    /// Base reward for a win.
    pub win_score: i32,
    /// Base penalty for a loss.
    pub loss_score: i32,
    /// Keep only the best N moves per piece at every node.
    pub per_piece_cap: Option<usize>,
}

impl MinimaxConfig {
    /// Default configuration for `rule`; the per-piece cap only applies to
    /// full-reach movement, where every piece can reach every empty cell.
    pub fn for_rule(rule: MovementRule) -> Self {
        Self {
            max_depth: 6,
            win_score: 1000,
            loss_score: 1200,
            per_piece_cap: match rule {
                MovementRule::Adjacency => None,
                MovementRule::FullReach => Some(2),
            },
        }
    }

    /// Overrides the depth cap.
    pub fn with_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
}

/// Outcome of a root search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Chosen move, `None` when the side has no legal move.
    pub best: Option<Move>,
    /// Score of the chosen move from the searching side's view.
    pub score: i32,
    /// Nodes visited.
    pub nodes: u64,
}

/// Alpha-beta search strategy.
#[derive(Debug, Clone)]
pub struct MinimaxStrategy {
    rule: MovementRule,
    config: MinimaxConfig,
}

impl MinimaxStrategy {
    /// Creates a search strategy with the default configuration for `rule`.
    pub fn new(rule: MovementRule) -> Self {
        Self::with_config(rule, MinimaxConfig::for_rule(rule))
    }

    /// Creates a search strategy with an explicit configuration.
    pub fn with_config(rule: MovementRule, config: MinimaxConfig) -> Self {
        Self { rule, config }
    }

    /// Active configuration.
    pub fn config(&self) -> &MinimaxConfig {
        &self.config
    }

    /// Searches for the best move for `side`.
    ///
    /// Among equally scored moves the earliest in canonical move order wins.
    /// Each root child is searched with `alpha` one below the best score so
    /// far, which makes a tying child report its exact score.
    #[instrument(skip(self, board), fields(board = %board, depth = self.config.max_depth))]
    pub fn search(&self, board: &Board, side: Side) -> SearchReport {
        let mut nodes = 0;
        let candidates = ordered_moves(board, side, self.rule, self.config.per_piece_cap);
        let mut best: Option<(i32, usize, Move)> = None;

        for (idx, mv) in candidates {
            let Ok(child) = board.apply(mv, self.rule) else {
                continue;
            };
            let alpha = best.map_or(i32::MIN, |(score, _, _)| score - 1);
            let score = self.alphabeta(&child, 1, alpha, i32::MAX, false, side, &mut nodes);
            let better = match best {
                None => true,
                Some((best_score, best_idx, _)) => {
                    score > best_score || (score == best_score && idx < best_idx)
                }
            };
            if better {
                best = Some((score, idx, mv));
            }
        }

        let report = match best {
            Some((score, _, mv)) => SearchReport {
                best: Some(mv),
                score,
                nodes,
            },
            None => SearchReport {
                best: None,
                score: evaluate(board, side),
                nodes,
            },
        };
        debug!(best = ?report.best, score = report.score, nodes = report.nodes, "Search finished");
        report
    }

    #[allow(clippy::too_many_arguments)]
    fn alphabeta(
        &self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        root: Side,
        nodes: &mut u64,
    ) -> i32 {
        *nodes += 1;
        let depth_score = i32::from(depth);

        if let Some(side) = winner(board) {
            return if side == root {
                self.config.win_score - depth_score
            } else {
                depth_score - self.config.loss_score
            };
        }
        if depth >= self.config.max_depth {
            return evaluate(board, root);
        }

        let mover = if maximizing { root } else { root.opponent() };
        let moves = ordered_moves(board, mover, self.rule, self.config.per_piece_cap);
        if moves.is_empty() {
            // Stalemate.
            return 0;
        }

        if maximizing {
            let mut value = i32::MIN;
            for (_, mv) in moves {
                let Ok(child) = board.apply(mv, self.rule) else {
                    continue;
                };
                value = value.max(self.alphabeta(&child, depth + 1, alpha, beta, false, root, nodes));
                alpha = alpha.max(value);
                if alpha >= beta {
                    break;
                }
            }
            value
        } else {
            let mut value = i32::MAX;
            for (_, mv) in moves {
                let Ok(child) = board.apply(mv, self.rule) else {
                    continue;
                };
                value = value.min(self.alphabeta(&child, depth + 1, alpha, beta, true, root, nodes));
                beta = beta.min(value);
                if alpha >= beta {
                    break;
                }
            }
            value
        }
    }
}

impl Strategy for MinimaxStrategy {
    fn choose(&mut self, board: &Board, side: Side) -> Option<Move> {
        self.search(board, side).best
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Minimax
    }
}
