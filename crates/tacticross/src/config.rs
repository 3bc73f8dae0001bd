//! Runtime configuration loaded from TOML.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tacticross_core::{Difficulty, MovementRule, Side};
use tracing::{debug, info, instrument};

/// Where AI moves come from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AiSource {
    /// A local strategy chosen by difficulty.
    #[default]
    Local,
    /// The remote LLM oracle, with local fallback.
    Oracle,
}

/// Configuration for a tacticross session.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct TacticrossConfig {
    /// Movement rule (adjacency or full_reach).
    #[serde(default)]
    movement_rule: MovementRule,

    /// Side the AI plays.
    #[serde(default = "default_ai_side")]
    ai_side: Side,

    /// AI difficulty.
    #[serde(default)]
    difficulty: Difficulty,

    /// Local strategy or remote oracle.
    #[serde(default)]
    ai_source: AiSource,

    /// Minimax depth cap.
    #[serde(default = "default_search_depth")]
    search_depth: u8,

    /// Seed for reproducible random play.
    #[serde(default)]
    seed: Option<u64>,

    /// LLM provider (openai or anthropic).
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name (e.g., "gpt-4o-mini", "claude-3-5-haiku-latest").
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Oracle deadline in milliseconds.
    #[serde(default = "default_oracle_timeout_ms")]
    oracle_timeout_ms: u64,

    /// Optional endpoint override for the LLM provider.
    #[serde(default)]
    api_base: Option<String>,
}

fn default_ai_side() -> Side {
    Side::P2
}

fn default_search_depth() -> u8 {
    6
}

#[instrument]
fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

#[instrument]
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

#[instrument]
fn default_max_tokens() -> u32 {
    150
}

fn default_oracle_timeout_ms() -> u64 {
    7000
}

impl Default for TacticrossConfig {
    fn default() -> Self {
        Self {
            movement_rule: MovementRule::default(),
            ai_side: default_ai_side(),
            difficulty: Difficulty::default(),
            ai_source: AiSource::default(),
            search_depth: default_search_depth(),
            seed: None,
            llm_provider: default_provider(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
            api_base: None,
        }
    }
}

/// Command-line overrides; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Movement rule.
    pub movement_rule: Option<MovementRule>,
    /// Difficulty.
    pub difficulty: Option<Difficulty>,
    /// AI side.
    pub ai_side: Option<Side>,
    /// AI source.
    pub ai_source: Option<AiSource>,
    /// Seed.
    pub seed: Option<u64>,
    /// Minimax depth.
    pub search_depth: Option<u8>,
}

impl TacticrossConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(rule = %config.movement_rule, difficulty = %config.difficulty, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.search_depth == 0 {
            return Err(ConfigError::new("search_depth must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!(path = %path.as_ref().display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(rule) = overrides.movement_rule {
            self.movement_rule = rule;
        }
        if let Some(difficulty) = overrides.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(side) = overrides.ai_side {
            self.ai_side = side;
        }
        if let Some(source) = overrides.ai_source {
            self.ai_source = source;
        }
        if let Some(depth) = overrides.search_depth {
            self.search_depth = depth.max(1);
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        self
    }

    /// Oracle deadline.
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    /// Creates LLM configuration from this config.
    /// Requires OPENAI_API_KEY or ANTHROPIC_API_KEY environment variable.
    #[instrument(skip(self), fields(provider = ?self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");

        let api_key = match self.llm_provider {
            LlmProvider::OpenAI => std::env::var("OPENAI_API_KEY").map_err(|_| {
                ConfigError::new("OPENAI_API_KEY environment variable not set".to_string())
            })?,
            LlmProvider::Anthropic => std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
                ConfigError::new("ANTHROPIC_API_KEY environment variable not set".to_string())
            })?,
        };

        Ok(LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        )
        .with_api_base(self.api_base.clone()))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = TacticrossConfig::from_toml("").unwrap();
        assert_eq!(config, TacticrossConfig::default());
        assert_eq!(*config.ai_side(), Side::P2);
        assert_eq!(*config.oracle_timeout_ms(), 7000);
        assert_eq!(config.llm_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_overrides_win() {
        let config = TacticrossConfig::from_toml("difficulty = \"easy\"\nseed = 3").unwrap();
        let config = config.with_overrides(&ConfigOverrides {
            difficulty: Some(Difficulty::Hard),
            movement_rule: Some(MovementRule::FullReach),
            ..ConfigOverrides::default()
        });
        assert_eq!(*config.difficulty(), Difficulty::Hard);
        assert_eq!(*config.movement_rule(), MovementRule::FullReach);
        assert_eq!(*config.seed(), Some(3));
    }

    #[test]
    fn test_rejects_zero_depth() {
        assert!(TacticrossConfig::from_toml("search_depth = 0").is_err());
    }
}
