use super::{MoveSource, Proposal};
use async_trait::async_trait;
use tacticross_core::{AiRequest, Difficulty, MovementRule, Strategy, strategy_with_depth};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// A local strategy seated as a player.
pub struct LocalPlayer {
    name: String,
    strategy: Mutex<Box<dyn Strategy + Send>>,
}

impl LocalPlayer {
    /// Wraps an existing strategy.
    pub fn new(name: impl Into<String>, strategy: Box<dyn Strategy + Send>) -> Self {
        Self {
            name: name.into(),
            strategy: Mutex::new(strategy),
        }
    }

    /// The strategy for `difficulty`, named after it.
    pub fn for_difficulty(difficulty: Difficulty, rule: MovementRule, seed: Option<u64>, depth: u8) -> Self {
        let strategy = strategy_with_depth(difficulty, rule, seed, depth);
        Self::new(format!("{} ({difficulty})", strategy.kind()), strategy)
    }
}

#[async_trait]
impl MoveSource for LocalPlayer {
    #[instrument(skip(self, request), fields(player = %self.name, id = request.id))]
    async fn propose(&self, request: &AiRequest) -> Proposal {
        let mv = self.strategy.lock().await.choose(&request.board, request.side);
        debug!(mv = ?mv, "Local strategy chose");
        Proposal::of(mv)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
