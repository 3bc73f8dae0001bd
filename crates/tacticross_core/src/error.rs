//! Error types for move application and match control.

use crate::position::Position;
use crate::types::{MovementRule, Side};

/// A move that fails board legality.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The source cell holds no piece.
    #[display("No piece on {}", _0)]
    EmptySource(#[error(not(source))] Position),

    /// The source piece belongs to someone else.
    #[display("Piece on {} belongs to {}", position, owner)]
    NotYourPiece {
        /// Source cell.
        position: Position,
        /// Actual owner.
        owner: Side,
    },

    /// The destination already holds a piece.
    #[display("Destination {} is occupied", _0)]
    DestinationOccupied(#[error(not(source))] Position),

    /// The destination is out of reach under the active rule.
    #[display("{} cannot reach {} under the {} rule", from, to, rule)]
    Unreachable {
        /// Source cell.
        from: Position,
        /// Destination cell.
        to: Position,
        /// Active movement rule.
        rule: MovementRule,
    },
}

/// A match-level request that cannot be honoured in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MatchError {
    /// The match has a game winner; only a full reset is accepted.
    #[display("Game is already over")]
    GameOver,

    /// The round has ended and is waiting for `next_round`.
    #[display("Round is over")]
    RoundOver,

    /// `next_round` was called while a round is still being played.
    #[display("Round is still in progress")]
    RoundInProgress,

    /// A side tried to act out of turn.
    #[display("It is {}'s turn, not {}'s", expected, actual)]
    WrongTurn {
        /// Side to act.
        expected: Side,
        /// Side that tried to act.
        actual: Side,
    },

    /// The move itself is illegal.
    #[display("Illegal move: {}", _0)]
    Illegal(MoveError),

    /// An AI move was requested while the AI is not the side to act.
    #[display("AI is not to act")]
    NotAiTurn,
}

impl From<MoveError> for MatchError {
    fn from(err: MoveError) -> Self {
        MatchError::Illegal(err)
    }
}

/// A tournament result that cannot be recorded.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TournamentError {
    /// No match carries this id.
    #[display("No match with id {}", _0)]
    UnknownMatch(#[error(not(source))] usize),

    /// The match already has a winner.
    #[display("Match {} is already decided", _0)]
    AlreadyDecided(#[error(not(source))] usize),

    /// The named winner is not playing in the match.
    #[display("Entrant {} is not playing in match {}", entrant, match_id)]
    NotInMatch {
        /// Match id.
        match_id: usize,
        /// Claimed winner.
        entrant: usize,
    },
}
