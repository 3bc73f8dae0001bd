//! Tacticross core - rules and AI for the 3x3 crossing board game.
//!
//! Each side starts with three pieces on its own edge column. A turn moves one
//! piece to an empty cell, and a line only wins when all three of its pieces
//! have moved. Matches are best of three rounds.
//!
//! # Architecture
//!
//! - **Board model**: [`Board`], [`Cell`], [`Move`], [`Position`]
//! - **Rules**: legal move generation and win detection under a selectable
//!   [`MovementRule`]
//! - **AI**: random, greedy and alpha-beta strategies behind [`Strategy`]
//! - **Orchestrator**: the [`Match`] state machine with AI request tickets
//! - **Progression**: survival runs, tournaments and the crossing animation
//!
//! # Example
//!
//! ```
//! use tacticross_core::{Difficulty, Match, MovementRule, Side, Strategy, strategy_for};
//!
//! let mut game = Match::new(MovementRule::Adjacency, Some(Side::P2));
//! let mut ai = strategy_for(Difficulty::Hard, MovementRule::Adjacency, Some(7));
//! let human = game.legal_moves()[0];
//! game.submit_move(Side::P1, human).unwrap();
//!
//! let request = game.request_ai_move().unwrap();
//! let reply = ai.choose(&request.board, request.side);
//! game.resolve_ai_move(request.id, reply);
//! assert_eq!(game.current_player(), Side::P1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod ai;
pub mod animation;
mod error;
pub mod invariants;
pub mod orchestrator;
mod position;
pub mod rules;
pub mod survival;
pub mod tournament;
mod types;

pub use ai::{
    GreedyReason, GreedyStrategy, MinimaxConfig, MinimaxStrategy, RandomStrategy, SearchReport,
    Strategy, StrategyKind, strategy_for, strategy_with_depth,
};
pub use animation::{AnimationPhase, CrossingAnimation, CrossingFinished, Sprite};
pub use error::{MatchError, MoveError, TournamentError};
pub use invariants::{BoardInvariants, Invariant, InvariantSet, InvariantViolation};
pub use orchestrator::{
    AiRequest, AiResolution, AiSeats, ClickOutcome, Match, MatchSnapshot, MoveOutcome, Phase, ROUNDS_TO_WIN,
    RoundsWon,
};
pub use position::{Position, SIZE, Zone};
pub use rules::{LINES, is_legal, legal_moves, validate, winner, winning_moves};
pub use survival::{PowerUp, RoundDamage, SurvivalRun, SurvivalStatus};
pub use tournament::{BracketMatch, Entrant, Tournament};
pub use types::{Board, Cell, Difficulty, MapTheme, Move, MovementRule, Side};
