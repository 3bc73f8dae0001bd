//! Move sources the driver can seat at the board.

mod human;
mod local;
mod oracle;

pub use human::{parse_command, spawn_stdin_reader};
pub use local::LocalPlayer;
pub use oracle::OraclePlayer;

use crate::config::{AiSource, ConfigError, TacticrossConfig};
use crate::oracle::RemoteOracle;
use async_trait::async_trait;
use std::sync::Arc;
use tacticross_core::{AiRequest, Move};
use tracing::{info, instrument};

/// A proposed move plus an optional note for the log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Proposal {
    /// Move to play, `None` when the source has nothing to offer.
    pub mv: Option<Move>,
    /// Free-form note (oracle reason, fallback cause).
    pub note: Option<String>,
}

impl Proposal {
    /// A bare move without a note.
    pub fn of(mv: Option<Move>) -> Self {
        Self { mv, note: None }
    }
}

/// Something that answers AI request tickets.
#[async_trait]
pub trait MoveSource: Send + Sync {
    /// Proposes a move for the ticket's side and board.
    async fn propose(&self, request: &AiRequest) -> Proposal;

    /// Display name.
    fn name(&self) -> &str;
}

/// Builds the AI seat described by `config`.
///
/// # Errors
///
/// Fails when the oracle is configured but its API key is missing.
#[instrument(skip(config), fields(source = %config.ai_source(), difficulty = %config.difficulty()))]
pub fn seat_for(config: &TacticrossConfig) -> Result<Arc<dyn MoveSource>, ConfigError> {
    let seat: Arc<dyn MoveSource> = match config.ai_source() {
        AiSource::Local => Arc::new(LocalPlayer::for_difficulty(
            *config.difficulty(),
            *config.movement_rule(),
            *config.seed(),
            *config.search_depth(),
        )),
        AiSource::Oracle => Arc::new(OraclePlayer::new(RemoteOracle::from_config(config)?)),
    };
    info!(seat = seat.name(), "AI seat ready");
    Ok(seat)
}
