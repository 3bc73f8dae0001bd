//! Remote move oracle.
//!
//! Asks an LLM for a move, then treats the answer as untrusted input: it is
//! parsed, checked against the legal move list for the current board and
//! discarded on any failure in favour of a local strategy chosen by
//! difficulty. Nothing the remote side says reaches the board unvalidated.

pub mod prompt;
pub mod reply;

pub use prompt::{OracleRequest, difficulty_instruction, system_prompt, temperature, user_message};
pub use reply::{CellToken, OracleReply, ParsedReply, ReplyCell, ReplyMove, parse_reply};

use crate::config::{ConfigError, TacticrossConfig};
use crate::llm_client::{CompletionBackend, CompletionRequest, LlmClient};
use derive_more::{Display, Error};
use std::sync::Arc;
use std::time::Duration;
use tacticross_core::{
    Board, Difficulty, Move, MovementRule, Side, Strategy, legal_moves, strategy_for, strategy_with_depth,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Default oracle deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(7000);

/// Why a remote suggestion was not used.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum OracleErrorKind {
    /// The deadline passed before a reply arrived.
    #[display("oracle timed out")]
    Timeout,
    /// Transport or provider failure.
    #[display("oracle unavailable: {}", _0)]
    Unavailable(String),
    /// The reply could not be turned into a move.
    #[display("malformed reply: {}", _0)]
    Malformed(String),
    /// The proposed move is not legal on the current board.
    #[display("illegal move {}", _0)]
    Illegal(Move),
    /// The side to act has nothing to play.
    #[display("no legal moves")]
    NoLegalMoves,
}

/// Oracle error with the location it was raised at.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", kind, file, line)]
pub struct OracleError {
    /// What went wrong.
    pub kind: OracleErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error.
    #[track_caller]
    pub fn new(kind: OracleErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        error!(kind = %kind, "Oracle error created");
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Where a decision came from.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DecisionOrigin {
    /// The remote suggestion passed validation.
    #[display("remote")]
    Remote,
    /// A local strategy replaced the remote suggestion.
    #[display("fallback ({})", _0)]
    Fallback(OracleErrorKind),
}

/// The move the oracle settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleDecision {
    /// Move to play; `None` only when no legal move exists.
    pub mv: Option<Move>,
    /// Remote or fallback.
    pub origin: DecisionOrigin,
    /// Justification given by the remote side, if it was used.
    pub reason: Option<String>,
}

impl OracleDecision {
    /// True when the remote suggestion was used.
    pub fn is_remote(&self) -> bool {
        self.origin == DecisionOrigin::Remote
    }
}

/// LLM-backed move source with local fallback.
pub struct RemoteOracle {
    backend: Arc<dyn CompletionBackend>,
    rule: MovementRule,
    difficulty: Difficulty,
    timeout: Duration,
    fallback: Mutex<Box<dyn Strategy + Send>>,
}

impl std::fmt::Debug for RemoteOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteOracle")
            .field("backend", &self.backend.label())
            .field("rule", &self.rule)
            .field("difficulty", &self.difficulty)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteOracle {
    /// Creates an oracle over `backend`, falling back to the local strategy
    /// for `difficulty`.
    #[instrument(skip(backend), fields(backend = %backend.label()))]
    pub fn new(backend: Arc<dyn CompletionBackend>, rule: MovementRule, difficulty: Difficulty) -> Self {
        Self {
            backend,
            rule,
            difficulty,
            timeout: DEFAULT_TIMEOUT,
            fallback: Mutex::new(strategy_for(difficulty, rule, None)),
        }
    }

    /// Builds the oracle described by `config`, talking to the configured
    /// provider.
    ///
    /// # Errors
    ///
    /// Fails when the provider's API key is missing.
    pub fn from_config(config: &TacticrossConfig) -> Result<Self, ConfigError> {
        let client = LlmClient::new(config.create_llm_config()?);
        let fallback = strategy_with_depth(
            *config.difficulty(),
            *config.movement_rule(),
            *config.seed(),
            *config.search_depth(),
        );
        Ok(Self::new(Arc::new(client), *config.movement_rule(), *config.difficulty())
            .with_timeout(config.oracle_timeout())
            .with_fallback(fallback))
    }

    /// Sets the deadline for one remote call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the fallback strategy.
    pub fn with_fallback(mut self, fallback: Box<dyn Strategy + Send>) -> Self {
        self.fallback = Mutex::new(fallback);
        self
    }

    /// Movement rule the oracle validates against.
    pub fn rule(&self) -> MovementRule {
        self.rule
    }

    /// Requested strength.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Deadline for one remote call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Asks the remote side for a move and validates it, without falling
    /// back.
    ///
    /// # Errors
    ///
    /// Any [`OracleErrorKind`]; the board is never touched.
    #[instrument(skip(self, board), fields(side = %side, difficulty = %self.difficulty))]
    pub async fn suggest(&self, board: &Board, side: Side) -> Result<ParsedReply, OracleError> {
        let legal = legal_moves(board, side, self.rule);
        if legal.is_empty() {
            return Err(OracleError::new(OracleErrorKind::NoLegalMoves));
        }

        let request = CompletionRequest::new(
            system_prompt(self.rule, self.difficulty),
            user_message(&OracleRequest::new(board, side, self.difficulty, self.rule)),
            temperature(self.difficulty),
        );

        debug!(timeout_ms = self.timeout.as_millis() as u64, "Querying oracle");
        let text = match tokio::time::timeout(self.timeout, self.backend.complete(&request)).await {
            Err(_) => return Err(OracleError::new(OracleErrorKind::Timeout)),
            Ok(Err(e)) => return Err(OracleError::new(OracleErrorKind::Unavailable(e.message))),
            Ok(Ok(text)) => text,
        };
        debug!(reply = %text, "Oracle replied");

        let parsed = parse_reply(&text, board, side)
            .map_err(|reason| OracleError::new(OracleErrorKind::Malformed(reason)))?;

        if !legal.contains(&parsed.mv) {
            return Err(OracleError::new(OracleErrorKind::Illegal(parsed.mv)));
        }
        Ok(parsed)
    }

    /// Settles on a move for `side`: the remote suggestion when it is legal,
    /// the local fallback otherwise.
    #[instrument(skip(self, board), fields(side = %side))]
    pub async fn request_move(&self, board: &Board, side: Side) -> OracleDecision {
        match self.suggest(board, side).await {
            Ok(parsed) => {
                info!(mv = %parsed.mv, "Using oracle move");
                OracleDecision {
                    mv: Some(parsed.mv),
                    origin: DecisionOrigin::Remote,
                    reason: parsed.reason,
                }
            }
            Err(err) => {
                warn!(reason = %err.kind, "Oracle suggestion discarded, using local strategy");
                let mv = self.fallback.lock().await.choose(board, side);
                OracleDecision {
                    mv,
                    origin: DecisionOrigin::Fallback(err.kind),
                    reason: None,
                }
            }
        }
    }
}
