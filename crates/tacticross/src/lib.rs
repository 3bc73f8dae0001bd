//! Tacticross runtime - match driver, remote move oracle and configuration.
//!
//! The rules and local AI live in [`tacticross_core`]; this crate adds the
//! asynchronous parts around them:
//!
//! - **LLM client**: OpenAI and Anthropic behind [`CompletionBackend`]
//! - **Oracle**: [`RemoteOracle`] turns an LLM answer into a validated move,
//!   falling back to a local strategy when the answer is unusable
//! - **Players**: [`MoveSource`] implementations for local strategies and the
//!   oracle, plus terminal input for humans
//! - **Driver**: [`MatchDriver`] runs a match and reports [`MatchEvent`]s
//! - **Survival**: [`SurvivalSession`] turns round results into HP damage
//! - **Config**: [`TacticrossConfig`] loaded from TOML

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod driver;
pub mod llm_client;
pub mod oracle;
pub mod players;
pub mod survival;

pub use config::{AiSource, ConfigError, ConfigOverrides, TacticrossConfig};
pub use driver::{DriverCommand, MatchDriver, MatchEvent, MatchSummary};
pub use llm_client::{CompletionBackend, CompletionRequest, LlmClient, LlmConfig, LlmError, LlmProvider};
pub use oracle::{DecisionOrigin, OracleDecision, OracleError, OracleErrorKind, RemoteOracle};
pub use players::{LocalPlayer, MoveSource, OraclePlayer, Proposal, seat_for};
pub use survival::{SurvivalSession, SurvivalStep, SurvivalUpdate, auto_power_up};
