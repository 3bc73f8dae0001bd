//! Async match loop.
//!
//! The driver owns the [`Match`] and is the only place that mutates it. Human
//! input arrives as [`DriverCommand`]s, AI seats are served by spawned
//! [`MoveSource`] tasks whose answers come back through a channel, and every
//! change is reported as a [`MatchEvent`]. An AI answer that arrives after a
//! reset is resolved against its ticket and dropped.

use crate::players::{MoveSource, Proposal};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tacticross_core::{
    AiResolution, AiSeats, ClickOutcome, GreedyStrategy, Match, MatchSnapshot, Move, MoveOutcome,
    MovementRule, Position, RoundsWon, Side, Strategy,
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Input accepted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    /// Click a cell.
    Click(Position),
    /// Move a piece directly.
    Move(Move),
    /// Start the next round after a round ended.
    NextRound,
    /// Start a fresh match.
    ResetMatch,
    /// Stop the driver.
    Quit,
}

/// Messages sent from the driver to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    /// Match state updated.
    StateChanged(MatchSnapshot),
    /// An AI seat is working on a move.
    AiThinking {
        /// Side the AI plays.
        side: Side,
        /// Name of the move source.
        source: String,
    },
    /// A move was applied.
    MoveMade {
        /// Mover.
        side: Side,
        /// The move.
        mv: Move,
        /// Note from the move source, if any.
        note: Option<String>,
    },
    /// A round ended; `winner` is `None` for a stalemate.
    RoundOver {
        /// Round winner.
        winner: Option<Side>,
        /// Counters after the round.
        rounds_won: RoundsWon,
    },
    /// The match is decided.
    GameOver {
        /// Match winner.
        winner: Side,
    },
    /// An AI answer arrived for a superseded board and was discarded.
    AiResponseDropped {
        /// Ticket id of the dropped answer.
        id: u64,
    },
    /// Human input that could not be applied.
    InputRejected {
        /// Why.
        reason: String,
    },
    /// The AI's own answer was unusable and the local fallback moved instead.
    Fallback {
        /// Side the AI plays.
        side: Side,
        /// What was wrong with the answer.
        reason: String,
    },
}

/// How a driver run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSummary {
    /// Match winner, if decided.
    pub winner: Option<Side>,
    /// Final round counters.
    pub rounds_won: RoundsWon,
    /// Moves applied during the run.
    pub plies: u32,
    /// True when the match reached a winner.
    pub finished: bool,
}

/// Runs one match between up to two AI seats and a human.
pub struct MatchDriver {
    game: Match,
    p1: Option<Arc<dyn MoveSource>>,
    p2: Option<Arc<dyn MoveSource>>,
    events: mpsc::UnboundedSender<MatchEvent>,
    round_delay: Option<Duration>,
    exit_on_game_over: bool,
    ply_limit: Option<u32>,
    plies: u32,
}

impl MatchDriver {
    /// Creates a driver. Seats without a source are human seats.
    pub fn new(
        rule: MovementRule,
        p1: Option<Arc<dyn MoveSource>>,
        p2: Option<Arc<dyn MoveSource>>,
        events: mpsc::UnboundedSender<MatchEvent>,
    ) -> Self {
        let seats = match (p1.is_some(), p2.is_some()) {
            (true, true) => AiSeats::Both,
            (true, false) => AiSeats::One(Side::P1),
            (false, true) => AiSeats::One(Side::P2),
            (false, false) => AiSeats::Nobody,
        };
        Self {
            game: Match::new(rule, seats),
            p1,
            p2,
            events,
            round_delay: None,
            exit_on_game_over: true,
            ply_limit: None,
            plies: 0,
        }
    }

    /// Starts the next round on its own after `delay` instead of waiting for
    /// [`DriverCommand::NextRound`].
    pub fn with_auto_advance(mut self, delay: Duration) -> Self {
        self.round_delay = Some(delay);
        self
    }

    /// Keeps running after the match is decided so a reset can follow.
    pub fn with_exit_on_game_over(mut self, exit: bool) -> Self {
        self.exit_on_game_over = exit;
        self
    }

    /// Stops the run after `limit` applied moves.
    pub fn with_ply_limit(mut self, limit: u32) -> Self {
        self.ply_limit = Some(limit);
        self
    }

    /// The match being driven.
    pub fn game(&self) -> &Match {
        &self.game
    }

    fn source(&self, side: Side) -> Option<&Arc<dyn MoveSource>> {
        match side {
            Side::P1 => self.p1.as_ref(),
            Side::P2 => self.p2.as_ref(),
        }
    }

    fn emit(&self, event: MatchEvent) {
        if self.events.send(event).is_err() {
            debug!("Event receiver closed");
        }
    }

    fn emit_state(&self) {
        self.emit(MatchEvent::StateChanged(self.game.snapshot()));
    }

    fn summary(&self) -> MatchSummary {
        let winner = self.game.game_winner();
        MatchSummary {
            winner,
            rounds_won: self.game.rounds_won(),
            plies: self.plies,
            finished: winner.is_some(),
        }
    }

    /// Runs until the match is decided, `Quit` arrives or nothing can make
    /// progress any more.
    ///
    /// # Errors
    ///
    /// Only on internal inconsistencies; bad input and bad AI answers are
    /// reported as events.
    #[instrument(skip(self, commands), fields(rule = %self.game.rule(), seats = ?self.game.ai_seats()))]
    pub async fn run(&mut self, mut commands: mpsc::UnboundedReceiver<DriverCommand>) -> Result<MatchSummary> {
        info!("Starting match");
        let (ai_tx, mut ai_rx) = mpsc::unbounded_channel::<(u64, Proposal)>();
        let mut commands_open = true;
        self.emit_state();

        loop {
            if self.game.game_winner().is_some() && self.exit_on_game_over {
                break;
            }
            if self.ply_limit.is_some_and(|limit| self.plies >= limit) {
                warn!(plies = self.plies, "Ply limit reached, stopping match");
                break;
            }

            self.dispatch_ai(&ai_tx);

            if !commands_open && !self.game.ai_thinking() {
                debug!("No input left and no AI pending");
                break;
            }

            tokio::select! {
                Some((id, proposal)) = ai_rx.recv() => {
                    self.on_ai_answer(id, proposal).await?;
                }
                command = commands.recv(), if commands_open => match command {
                    None => commands_open = false,
                    Some(DriverCommand::Quit) => {
                        info!("Quit requested");
                        break;
                    }
                    Some(command) => self.on_command(command).await?,
                },
            }
        }

        let summary = self.summary();
        info!(winner = ?summary.winner, plies = summary.plies, "Match finished");
        Ok(summary)
    }

    fn dispatch_ai(&mut self, ai_tx: &mpsc::UnboundedSender<(u64, Proposal)>) {
        let Some(request) = self.game.request_ai_move() else {
            return;
        };
        let Some(source) = self.source(request.side).cloned() else {
            warn!(side = %request.side, "AI seat has no move source");
            return;
        };
        self.emit(MatchEvent::AiThinking {
            side: request.side,
            source: source.name().to_string(),
        });
        self.emit_state();

        let tx = ai_tx.clone();
        tokio::spawn(async move {
            let proposal = source.propose(&request).await;
            let _ = tx.send((request.id, proposal));
        });
    }

    #[instrument(skip(self, proposal), fields(mv = ?proposal.mv))]
    async fn on_ai_answer(&mut self, id: u64, proposal: Proposal) -> Result<()> {
        let side = self.game.current_player();
        match self.game.resolve_ai_move(id, proposal.mv) {
            AiResolution::Applied(outcome) => match proposal.mv {
                Some(mv) => self.applied(side, mv, proposal.note, outcome).await?,
                None => self.after_move(outcome).await?,
            },
            AiResolution::Stale => {
                self.emit(MatchEvent::AiResponseDropped { id });
            }
            AiResolution::Stalemate => {
                self.after_move(MoveOutcome::Stalemate).await?;
            }
            AiResolution::Rejected(err) => {
                self.fallback_move(side, err.to_string()).await?;
            }
            AiResolution::Declined => {
                self.fallback_move(side, "no move offered".to_string()).await?;
            }
        }
        Ok(())
    }

    async fn fallback_move(&mut self, side: Side, reason: String) -> Result<()> {
        warn!(side = %side, reason = %reason, "Replacing unusable AI answer");
        let mut greedy = GreedyStrategy::new(self.game.rule(), None);
        let Some(mv) = greedy.choose(self.game.board(), side) else {
            return Ok(());
        };
        self.emit(MatchEvent::Fallback { side, reason });
        let outcome = self
            .game
            .submit_move(side, mv)
            .context("applying fallback move")?;
        self.applied(side, mv, Some("fallback".to_string()), outcome).await
    }

    async fn on_command(&mut self, command: DriverCommand) -> Result<()> {
        debug!(command = ?command, "Command received");
        match command {
            DriverCommand::Click(pos) => {
                let side = self.game.current_player();
                let selected = self.game.snapshot().selected;
                match self.game.click(pos) {
                    ClickOutcome::Ignored => self.reject(format!("click on {pos} ignored")),
                    ClickOutcome::Selected(_) | ClickOutcome::Deselected => self.emit_state(),
                    ClickOutcome::Moved(outcome) => {
                        match selected {
                            Some(from) => self.applied(side, Move::new(from, pos), None, outcome).await?,
                            None => self.after_move(outcome).await?,
                        }
                    }
                }
            }
            DriverCommand::Move(mv) => {
                let side = self.game.current_player();
                if self.game.ai_seats().contains(side) {
                    self.reject(format!("it is the AI's turn ({side})"));
                    return Ok(());
                }
                match self.game.submit_move(side, mv) {
                    Ok(outcome) => self.applied(side, mv, None, outcome).await?,
                    Err(e) => self.reject(e.to_string()),
                }
            }
            DriverCommand::NextRound => match self.game.next_round() {
                Ok(()) => self.emit_state(),
                Err(e) => self.reject(e.to_string()),
            },
            DriverCommand::ResetMatch => {
                self.game.reset_match();
                self.emit_state();
            }
            DriverCommand::Quit => {}
        }
        Ok(())
    }

    fn reject(&self, reason: String) {
        debug!(reason = %reason, "Input rejected");
        self.emit(MatchEvent::InputRejected { reason });
    }

    async fn applied(&mut self, side: Side, mv: Move, note: Option<String>, outcome: MoveOutcome) -> Result<()> {
        self.plies += 1;
        self.emit(MatchEvent::MoveMade { side, mv, note });
        self.after_move(outcome).await
    }

    async fn after_move(&mut self, outcome: MoveOutcome) -> Result<()> {
        self.emit_state();

        let round_ended = match outcome {
            MoveOutcome::Continue { .. } => false,
            MoveOutcome::RoundWon {
                winner,
                rounds_won,
                game_over,
            } => {
                self.emit(MatchEvent::RoundOver {
                    winner: Some(winner),
                    rounds_won,
                });
                if game_over {
                    self.emit(MatchEvent::GameOver { winner });
                    return Ok(());
                }
                true
            }
            MoveOutcome::Stalemate => {
                self.emit(MatchEvent::RoundOver {
                    winner: None,
                    rounds_won: self.game.rounds_won(),
                });
                true
            }
        };

        if round_ended && let Some(delay) = self.round_delay {
            tokio::time::sleep(delay).await;
            self.game.next_round().context("starting next round")?;
            self.emit_state();
        }
        Ok(())
    }
}
