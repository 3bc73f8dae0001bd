//! Prompt construction for the remote oracle.

use super::reply::{CellToken, OracleReply, board_tokens};
use serde::Serialize;
use tacticross_core::{Board, Difficulty, MovementRule, Side};
use tracing::instrument;

/// Sampling temperature for `difficulty`.
pub fn temperature(difficulty: Difficulty) -> f32 {
    match difficulty {
        Difficulty::Easy => 1.2,
        Difficulty::Medium => 0.7,
        Difficulty::Hard => 0.2,
    }
}

/// How hard the oracle is told to try.
pub fn difficulty_instruction(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Play a random or not optimal move.",
        Difficulty::Medium => "Play a reasonable move.",
        Difficulty::Hard => "Play the best possible move to win.",
    }
}

fn movement_text(rule: MovementRule) -> &'static str {
    match rule {
        MovementRule::Adjacency => {
            "A piece moves one step up, down, left or right into an empty cell."
        }
        MovementRule::FullReach => "A piece moves to any empty cell on the board.",
    }
}

/// The request body sent as the user message.
#[derive(Debug, Clone, Serialize)]
pub struct OracleRequest {
    /// Side to move.
    pub side: Side,
    /// Requested strength.
    pub difficulty: Difficulty,
    /// Movement rule in force.
    pub movement_rule: MovementRule,
    /// Board, rows top to bottom.
    pub board: Vec<Vec<CellToken>>,
}

impl OracleRequest {
    /// Builds the request for `side` on `board`.
    pub fn new(board: &Board, side: Side, difficulty: Difficulty, movement_rule: MovementRule) -> Self {
        Self {
            side,
            difficulty,
            movement_rule,
            board: board_tokens(board),
        }
    }
}

/// System prompt: rules, difficulty instruction and reply schema.
#[instrument]
pub fn system_prompt(rule: MovementRule, difficulty: Difficulty) -> String {
    let schema = schemars::schema_for!(OracleReply);
    let schema = serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are playing tacticross on a 3x3 grid. Rows and columns are numbered 0 to 2 \
         from the top left. Each side has three pieces: p2 starts in column 0, p1 in column 2.\n\
         On your turn you move exactly one of your own pieces into an empty cell. {movement}\n\
         A piece that has moved is marked with the suffix _moved. A side wins by filling a row, \
         column or diagonal with three of its own pieces that have all moved; pieces still on \
         their starting cells do not count.\n\
         {instruction}\n\
         Answer with a single JSON object matching this schema and nothing else. Prefer the \
         `move` field; `reason` is one short sentence.\n{schema}",
        movement = movement_text(rule),
        instruction = difficulty_instruction(difficulty),
    )
}

/// User message: the JSON request.
pub fn user_message(request: &OracleRequest) -> String {
    serde_json::to_string(request).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperatures() {
        assert_eq!(temperature(Difficulty::Easy), 1.2);
        assert_eq!(temperature(Difficulty::Medium), 0.7);
        assert_eq!(temperature(Difficulty::Hard), 0.2);
    }

    #[test]
    fn test_system_prompt_mentions_rule_and_schema() {
        let prompt = system_prompt(MovementRule::FullReach, Difficulty::Hard);
        assert!(prompt.contains("any empty cell"));
        assert!(prompt.contains("best possible move"));
        assert!(prompt.contains("\"reason\""));
    }

    #[test]
    fn test_user_message_tokens() {
        let request = OracleRequest::new(&Board::initial(), Side::P2, Difficulty::Easy, MovementRule::Adjacency);
        let json: serde_json::Value = serde_json::from_str(&user_message(&request)).unwrap();
        assert_eq!(json["side"], "p2");
        assert_eq!(json["difficulty"], "easy");
        assert_eq!(json["movement_rule"], "adjacency");
        assert_eq!(json["board"][0], serde_json::json!(["p2", "empty", "p1"]));
    }
}
