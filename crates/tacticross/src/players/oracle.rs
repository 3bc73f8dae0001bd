use super::{MoveSource, Proposal};
use crate::oracle::{DecisionOrigin, RemoteOracle};
use async_trait::async_trait;
use tacticross_core::AiRequest;
use tracing::instrument;

/// The remote oracle seated as a player.
#[derive(Debug)]
pub struct OraclePlayer {
    name: String,
    oracle: RemoteOracle,
}

impl OraclePlayer {
    /// Wraps `oracle`.
    pub fn new(oracle: RemoteOracle) -> Self {
        Self {
            name: format!("oracle ({})", oracle.difficulty()),
            oracle,
        }
    }

    /// The wrapped oracle.
    pub fn oracle(&self) -> &RemoteOracle {
        &self.oracle
    }
}

#[async_trait]
impl MoveSource for OraclePlayer {
    #[instrument(skip(self, request), fields(id = request.id, side = %request.side))]
    async fn propose(&self, request: &AiRequest) -> Proposal {
        let decision = self.oracle.request_move(&request.board, request.side).await;
        let note = match decision.origin {
            DecisionOrigin::Remote => decision.reason,
            origin @ DecisionOrigin::Fallback(_) => Some(origin.to_string()),
        };
        Proposal { mv: decision.mv, note }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
