//! Match and round orchestration.
//!
//! [`Match`] exclusively owns the board and the round counters. Human input
//! arrives as cell clicks, AI input through request tickets: the AI source
//! receives an [`AiRequest`] carrying the board revision it was issued for and
//! hands its answer back through [`Match::resolve_ai_move`]. Answers for a
//! superseded revision are dropped, and at most one request is outstanding
//! per revision.
//!
//! ```text
//! AwaitingSelection <-> PieceSelected
//!        |  move applied
//!        v
//!    RoundOver --next_round--> AwaitingSelection
//!        |  second round win
//!        v
//!    GameOver --reset_match--> AwaitingSelection
//! ```

use crate::error::{MatchError, MoveError};
use crate::invariants::{BoardInvariants, InvariantSet};
use crate::position::Position;
use crate::rules::{is_legal, legal_moves, winner};
use crate::types::{Board, Move, MovementRule, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Round wins needed to take the match.
pub const ROUNDS_TO_WIN: u8 = 2;

/// Where the match currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// The side to act has not picked a piece.
    AwaitingSelection,
    /// The side to act has picked the piece on this cell.
    PieceSelected(Position),
    /// The round ended; `None` means stalemate.
    RoundOver {
        /// Round winner.
        winner: Option<Side>,
    },
    /// A side reached [`ROUNDS_TO_WIN`].
    GameOver {
        /// Match winner.
        winner: Side,
    },
}

impl Phase {
    /// True while moves are accepted.
    pub fn is_playing(self) -> bool {
        matches!(self, Phase::AwaitingSelection | Phase::PieceSelected(_))
    }
}

/// Round wins per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundsWon {
    /// Rounds taken by P1.
    pub p1: u8,
    /// Rounds taken by P2.
    pub p2: u8,
}

impl RoundsWon {
    /// Rounds taken by `side`.
    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::P1 => self.p1,
            Side::P2 => self.p2,
        }
    }

    fn increment(&mut self, side: Side) -> u8 {
        let slot = match side {
            Side::P1 => &mut self.p1,
            Side::P2 => &mut self.p2,
        };
        *slot = slot.saturating_add(1);
        *slot
    }
}

/// Result of an applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Play continues with `next` to act.
    Continue {
        /// Side to act next.
        next: Side,
    },
    /// The mover completed a line.
    RoundWon {
        /// Round winner.
        winner: Side,
        /// Counters after the increment.
        rounds_won: RoundsWon,
        /// True when this round decided the match.
        game_over: bool,
    },
    /// The side to act has no legal move; the round ends without a winner.
    Stalemate,
}

/// Result of a cell click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing changed.
    Ignored,
    /// A piece is now selected.
    Selected(Position),
    /// The selection was cleared.
    Deselected,
    /// The selected piece moved.
    Moved(MoveOutcome),
}

/// A ticket asking the AI source for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiRequest {
    /// Ticket id, echoed back on resolution.
    pub id: u64,
    /// Board revision the request was issued for.
    pub revision: u64,
    /// Board snapshot to decide on.
    pub board: Board,
    /// Side the AI plays.
    pub side: Side,
}

/// Result of handing an AI answer back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiResolution {
    /// The move was applied.
    Applied(MoveOutcome),
    /// The ticket no longer matches the board; nothing changed.
    Stale,
    /// The move is illegal on the current board; the request may be reissued.
    Rejected(MoveError),
    /// The AI had no move to offer and none exists; the round is drawn.
    Stalemate,
    /// The AI offered nothing although legal moves exist; the request may be
    /// reissued.
    Declined,
}

/// Serializable view of the match for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Current board.
    pub board: Board,
    /// Side to act.
    pub current_player: Side,
    /// Selected piece, if any.
    pub selected: Option<Position>,
    /// Winner of the round just finished.
    pub round_winner: Option<Side>,
    /// Winner of the match.
    pub game_winner: Option<Side>,
    /// Round counters.
    pub rounds_won: RoundsWon,
    /// True while an AI request is outstanding.
    pub ai_thinking: bool,
    /// Board revision.
    pub revision: u64,
}

/// Which sides are played by an AI source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiSeats {
    /// Two humans.
    #[default]
    Nobody,
    /// The AI plays one side.
    One(Side),
    /// AI against AI.
    Both,
}

impl AiSeats {
    /// True when the AI plays `side`.
    pub fn contains(self, side: Side) -> bool {
        match self {
            AiSeats::Nobody => false,
            AiSeats::One(ai) => ai == side,
            AiSeats::Both => true,
        }
    }
}

impl From<Option<Side>> for AiSeats {
    fn from(side: Option<Side>) -> Self {
        side.map_or(AiSeats::Nobody, AiSeats::One)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRequest {
    id: u64,
    revision: u64,
}

/// A best-of-three match.
#[derive(Debug, Clone)]
pub struct Match {
    rule: MovementRule,
    ai_seats: AiSeats,
    board: Board,
    current: Side,
    phase: Phase,
    rounds_won: RoundsWon,
    revision: u64,
    next_ticket: u64,
    pending: Option<PendingRequest>,
}

impl Match {
    /// Starts a match. `ai_seats` accepts an `Option<Side>`, `None` meaning
    /// two human players.
    #[instrument(skip(ai_seats))]
    pub fn new(rule: MovementRule, ai_seats: impl Into<AiSeats>) -> Self {
        Self::from_parts(rule, ai_seats, Board::initial(), Side::P1, RoundsWon::default())
    }

    /// Resumes a match from an arbitrary in-progress position.
    pub fn from_parts(
        rule: MovementRule,
        ai_seats: impl Into<AiSeats>,
        board: Board,
        current: Side,
        rounds_won: RoundsWon,
    ) -> Self {
        Self {
            rule,
            ai_seats: ai_seats.into(),
            board,
            current,
            phase: Phase::AwaitingSelection,
            rounds_won,
            revision: 0,
            next_ticket: 0,
            pending: None,
        }
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to act.
    pub fn current_player(&self) -> Side {
        self.current
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Active movement rule.
    pub fn rule(&self) -> MovementRule {
        self.rule
    }

    /// Sides played by the AI.
    pub fn ai_seats(&self) -> AiSeats {
        self.ai_seats
    }

    /// Round counters.
    pub fn rounds_won(&self) -> RoundsWon {
        self.rounds_won
    }

    /// Board revision; bumps on every applied move and every reset.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Match winner, once decided.
    pub fn game_winner(&self) -> Option<Side> {
        match self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    /// Winner of the round that just ended.
    pub fn round_winner(&self) -> Option<Side> {
        match self.phase {
            Phase::RoundOver { winner } => winner,
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    /// True while an AI request is outstanding.
    pub fn ai_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// True when the AI is the side to act in a live round.
    pub fn is_ai_turn(&self) -> bool {
        self.phase.is_playing() && self.ai_seats.contains(self.current)
    }

    /// Legal moves for the side to act.
    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.board, self.current, self.rule)
    }

    /// Presentation snapshot.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            board: self.board,
            current_player: self.current,
            selected: match self.phase {
                Phase::PieceSelected(pos) => Some(pos),
                _ => None,
            },
            round_winner: self.round_winner(),
            game_winner: self.game_winner(),
            rounds_won: self.rounds_won,
            ai_thinking: self.ai_thinking(),
            revision: self.revision,
        }
    }

    /// Handles a human cell click.
    ///
    /// Ignored outside a live round, while the AI is to act or thinking, and
    /// on cells that neither hold an own piece nor complete a legal move.
    #[instrument(skip(self), fields(current = %self.current, phase = ?self.phase))]
    pub fn click(&mut self, pos: Position) -> ClickOutcome {
        if !self.phase.is_playing() || self.is_ai_turn() || self.ai_thinking() {
            debug!("Click ignored");
            return ClickOutcome::Ignored;
        }

        let own_piece = self.board.get(pos).owner == Some(self.current);
        match self.phase {
            Phase::PieceSelected(selected) if selected == pos => {
                self.phase = Phase::AwaitingSelection;
                ClickOutcome::Deselected
            }
            _ if own_piece => {
                self.phase = Phase::PieceSelected(pos);
                ClickOutcome::Selected(pos)
            }
            Phase::PieceSelected(selected) => {
                let mv = Move::new(selected, pos);
                if is_legal(&self.board, self.current, mv, self.rule) {
                    ClickOutcome::Moved(self.commit(mv))
                } else {
                    debug!(mv = %mv, "Destination not reachable, clearing selection");
                    self.phase = Phase::AwaitingSelection;
                    ClickOutcome::Deselected
                }
            }
            _ => ClickOutcome::Ignored,
        }
    }

    /// Applies a complete move for `side`.
    ///
    /// # Errors
    ///
    /// [`MatchError`] when the round is not live, `side` is not to act, or
    /// the move is illegal. The match is unchanged on error.
    #[instrument(skip(self), fields(mv = %mv))]
    pub fn submit_move(&mut self, side: Side, mv: Move) -> Result<MoveOutcome, MatchError> {
        self.ensure_playing()?;
        if side != self.current {
            return Err(MatchError::WrongTurn {
                expected: self.current,
                actual: side,
            });
        }
        self.board.apply_for(side, mv, self.rule)?;
        Ok(self.commit(mv))
    }

    /// Issues an AI request ticket.
    ///
    /// Returns `None` when the AI is not to act or a request for the current
    /// revision is already outstanding.
    #[instrument(skip(self), fields(revision = self.revision))]
    pub fn request_ai_move(&mut self) -> Option<AiRequest> {
        if !self.is_ai_turn() {
            return None;
        }
        if self.pending.is_some_and(|p| p.revision == self.revision) {
            debug!("AI request already outstanding");
            return None;
        }
        self.next_ticket += 1;
        let request = AiRequest {
            id: self.next_ticket,
            revision: self.revision,
            board: self.board,
            side: self.current,
        };
        self.pending = Some(PendingRequest {
            id: request.id,
            revision: request.revision,
        });
        debug!(id = request.id, side = %request.side, "AI request issued");
        Some(request)
    }

    /// Hands back the AI's answer to ticket `id`.
    #[instrument(skip(self), fields(revision = self.revision))]
    pub fn resolve_ai_move(&mut self, id: u64, mv: Option<Move>) -> AiResolution {
        let Some(pending) = self.pending.filter(|p| p.id == id) else {
            warn!(id, "Dropping AI response for unknown ticket");
            return AiResolution::Stale;
        };
        self.pending = None;
        if pending.revision != self.revision || !self.is_ai_turn() {
            warn!(id, issued = pending.revision, "Dropping stale AI response");
            return AiResolution::Stale;
        }

        let Some(mv) = mv else {
            if self.legal_moves().is_empty() {
                self.end_in_stalemate();
                return AiResolution::Stalemate;
            }
            warn!(id, "AI offered no move");
            return AiResolution::Declined;
        };

        match self.board.apply_for(self.current, mv, self.rule) {
            Ok(_) => AiResolution::Applied(self.commit(mv)),
            Err(err) => {
                warn!(id, mv = %mv, error = %err, "Rejecting illegal AI move");
                AiResolution::Rejected(err)
            }
        }
    }

    /// Starts the next round after a round win or stalemate. Round counters
    /// persist; P1 always opens.
    ///
    /// # Errors
    ///
    /// [`MatchError::GameOver`] once the match is decided,
    /// [`MatchError::RoundInProgress`] while the round is still live.
    #[instrument(skip(self))]
    pub fn next_round(&mut self) -> Result<(), MatchError> {
        match self.phase {
            Phase::RoundOver { .. } => {
                self.reset_board();
                info!(rounds = ?self.rounds_won, "Next round");
                Ok(())
            }
            Phase::GameOver { .. } => Err(MatchError::GameOver),
            _ => Err(MatchError::RoundInProgress),
        }
    }

    /// Starts a fresh match, clearing round counters. Any outstanding AI
    /// request becomes stale.
    #[instrument(skip(self))]
    pub fn reset_match(&mut self) {
        self.rounds_won = RoundsWon::default();
        self.reset_board();
        info!("Match reset");
    }

    fn reset_board(&mut self) {
        self.board = Board::initial();
        self.current = Side::P1;
        self.phase = Phase::AwaitingSelection;
        self.revision += 1;
        self.pending = None;
    }

    fn ensure_playing(&self) -> Result<(), MatchError> {
        match self.phase {
            Phase::GameOver { .. } => Err(MatchError::GameOver),
            Phase::RoundOver { .. } => Err(MatchError::RoundOver),
            _ => Ok(()),
        }
    }

    fn end_in_stalemate(&mut self) -> MoveOutcome {
        info!(side = %self.current, "No legal moves, round drawn");
        self.phase = Phase::RoundOver { winner: None };
        self.pending = None;
        MoveOutcome::Stalemate
    }

    /// Applies a pre-validated move and advances the state machine.
    fn commit(&mut self, mv: Move) -> MoveOutcome {
        let mover = self.current;
        match self.board.apply_for(mover, mv, self.rule) {
            Ok(next) => self.board = next,
            Err(err) => {
                error!(mv = %mv, error = %err, "Pre-validated move failed to apply");
                return MoveOutcome::Continue { next: mover };
            }
        }
        self.revision += 1;
        self.pending = None;
        self.phase = Phase::AwaitingSelection;

        if let Err(violations) = BoardInvariants::check_all(&self.board) {
            for violation in violations {
                error!(board = %self.board, "Invariant violated: {}", violation.description);
            }
        }

        if let Some(side) = winner(&self.board) {
            let rounds = self.rounds_won.increment(side);
            let game_over = rounds >= ROUNDS_TO_WIN;
            self.phase = if game_over {
                info!(winner = %side, "Game won");
                Phase::GameOver { winner: side }
            } else {
                info!(winner = %side, rounds, "Round won");
                Phase::RoundOver { winner: Some(side) }
            };
            return MoveOutcome::RoundWon {
                winner: side,
                rounds_won: self.rounds_won,
                game_over,
            };
        }

        self.current = mover.opponent();
        if self.legal_moves().is_empty() {
            return self.end_in_stalemate();
        }
        debug!(next = %self.current, "Turn passes");
        MoveOutcome::Continue { next: self.current }
    }
}
