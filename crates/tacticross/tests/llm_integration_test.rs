//! Live provider tests. Run with `--features api`.

use std::sync::Arc;
use tacticross::llm_client::{LlmClient, LlmConfig, LlmProvider};
use tacticross::{DecisionOrigin, RemoteOracle};
use tacticross_core::{Board, Difficulty, MovementRule, Side, is_legal};
use tracing::instrument;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_connectivity() {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("ANTHROPIC_API_KEY").expect("ANTHROPIC_API_KEY not set");
    let config = LlmConfig::new(
        LlmProvider::Anthropic,
        api_key,
        "claude-3-5-haiku-latest".to_string(),
        50,
    );
    let client = LlmClient::new(config);

    let response = client
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.", 0.2)
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_oracle_returns_legal_move() {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
    let config = LlmConfig::new(LlmProvider::OpenAI, api_key, "gpt-4o-mini".to_string(), 150);
    let oracle = RemoteOracle::new(
        Arc::new(LlmClient::new(config)),
        MovementRule::Adjacency,
        Difficulty::Hard,
    );

    let board = Board::initial();
    let decision = oracle.request_move(&board, Side::P2).await;
    let mv = decision.mv.expect("opening board always has moves");

    assert!(is_legal(&board, Side::P2, mv, MovementRule::Adjacency));
    if decision.origin != DecisionOrigin::Remote {
        eprintln!("Oracle fell back: {}", decision.origin);
    }
}
