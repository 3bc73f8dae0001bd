//! Loading configuration from disk.

use std::io::Write;
use tacticross::{AiSource, ConfigOverrides, LlmProvider, TacticrossConfig};
use tacticross_core::{Difficulty, MovementRule, Side};

#[test]
fn test_loads_full_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
movement_rule = "full_reach"
ai_side = "p1"
difficulty = "hard"
ai_source = "oracle"
search_depth = 4
seed = 42
llm_provider = "anthropic"
llm_model = "claude-3-5-haiku-latest"
llm_max_tokens = 200
oracle_timeout_ms = 3000
api_base = "http://localhost:8080"
"#
    )
    .unwrap();

    let config = TacticrossConfig::from_file(file.path()).unwrap();

    assert_eq!(*config.movement_rule(), MovementRule::FullReach);
    assert_eq!(*config.ai_side(), Side::P1);
    assert_eq!(*config.difficulty(), Difficulty::Hard);
    assert_eq!(*config.ai_source(), AiSource::Oracle);
    assert_eq!(*config.search_depth(), 4);
    assert_eq!(*config.seed(), Some(42));
    assert_eq!(*config.llm_provider(), LlmProvider::Anthropic);
    assert_eq!(*config.llm_max_tokens(), 200);
    assert_eq!(config.oracle_timeout().as_millis(), 3000);
    assert_eq!(config.api_base().as_deref(), Some("http://localhost:8080"));
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TacticrossConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TacticrossConfig::default());
    assert_eq!(*config.movement_rule(), MovementRule::Adjacency);
    assert_eq!(*config.difficulty(), Difficulty::Medium);
    assert_eq!(*config.ai_source(), AiSource::Local);
}

#[test]
fn test_bad_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "difficulty = \"impossible\"").unwrap();

    let err = TacticrossConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_zero_depth_override_is_clamped() {
    let config = TacticrossConfig::default().with_overrides(&ConfigOverrides {
        search_depth: Some(0),
        ai_side: Some(Side::P1),
        ..ConfigOverrides::default()
    });
    assert_eq!(*config.search_depth(), 1);
    assert_eq!(*config.ai_side(), Side::P1);
}
