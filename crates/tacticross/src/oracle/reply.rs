//! Reply format of the remote oracle and its parsing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tacticross_core::{Board, Cell, Move, Position, Side};
use tracing::{debug, instrument};

/// Per-cell token used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CellToken {
    /// No piece.
    Empty,
    /// Player one, still on its starting cell.
    P1,
    /// Player one, arrived by moving.
    P1Moved,
    /// Player two, still on its starting cell.
    P2,
    /// Player two, arrived by moving.
    P2Moved,
}

impl From<Cell> for CellToken {
    fn from(cell: Cell) -> Self {
        match (cell.owner, cell.moved) {
            (None, _) => CellToken::Empty,
            (Some(Side::P1), false) => CellToken::P1,
            (Some(Side::P1), true) => CellToken::P1Moved,
            (Some(Side::P2), false) => CellToken::P2,
            (Some(Side::P2), true) => CellToken::P2Moved,
        }
    }
}

impl CellToken {
    /// Owning side, if any.
    pub fn owner(self) -> Option<Side> {
        match self {
            CellToken::Empty => None,
            CellToken::P1 | CellToken::P1Moved => Some(Side::P1),
            CellToken::P2 | CellToken::P2Moved => Some(Side::P2),
        }
    }
}

/// Board as a 3x3 grid of tokens, rows top to bottom.
pub fn board_tokens(board: &Board) -> Vec<Vec<CellToken>> {
    board
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| CellToken::from(*cell)).collect())
        .collect()
}

/// A cell coordinate in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReplyCell {
    /// Row, 0 at the top.
    pub row: u8,
    /// Column, 0 at the left.
    pub col: u8,
}

/// An explicit move in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReplyMove {
    /// Cell the piece leaves.
    pub from: ReplyCell,
    /// Cell the piece enters.
    pub to: ReplyCell,
}

/// What the oracle is asked to answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OracleReply {
    /// The move to play.
    #[serde(rename = "move", default)]
    pub mv: Option<ReplyMove>,
    /// The board after the move, as an alternative to `move`.
    #[serde(default)]
    pub board: Option<Vec<Vec<CellToken>>>,
    /// One short sentence explaining the choice.
    #[serde(default)]
    pub reason: Option<String>,
}

/// A parsed reply: the proposed move plus the stated reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Proposed move, not yet checked for legality.
    pub mv: Move,
    /// Justification, if any.
    pub reason: Option<String>,
}

fn to_position(cell: ReplyCell) -> Result<Position, String> {
    Position::new(cell.row, cell.col)
        .ok_or_else(|| format!("cell ({},{}) is off the board", cell.row, cell.col))
}

/// Strips markdown fences and surrounding prose down to the outermost
/// JSON object.
fn json_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Reads an `r,c` cell that ends where `text` ends.
///
/// Both coordinates are whole digit runs, so `10,0` never shrinks to `0,0`.
fn trailing_cell(text: &str) -> Option<Position> {
    let text = text.trim_end();
    let text = text.strip_suffix(')').unwrap_or(text).trim_end();
    let col_start = text.trim_end_matches(is_digit).len();
    let head = text[..col_start].strip_suffix(',')?;
    let row_start = head.trim_end_matches(is_digit).len();
    cell_from_runs(&head[row_start..], &text[col_start..])
}

/// Reads an `r,c` cell that starts where `text` starts.
fn leading_cell(text: &str) -> Option<Position> {
    let text = text.trim_start();
    let text = text.strip_prefix('(').unwrap_or(text).trim_start();
    let row_end = text.len() - text.trim_start_matches(is_digit).len();
    let tail = text[row_end..].strip_prefix(',')?;
    let col_end = tail.len() - tail.trim_start_matches(is_digit).len();
    cell_from_runs(&text[..row_end], &tail[..col_end])
}

fn cell_from_runs(row: &str, col: &str) -> Option<Position> {
    if row.is_empty() || col.is_empty() {
        return None;
    }
    Position::new(row.parse().ok()?, col.parse().ok()?)
}

/// Finds the first `r,c -> r,c` in free text, parentheses optional.
///
/// Coordinates outside the board, including multi-digit ones, make an arrow
/// unusable rather than being cut down to a cell that exists.
pub fn parse_arrow_move(text: &str) -> Option<Move> {
    let mut offset = 0;
    while let Some(found) = text[offset..].find("->") {
        let idx = offset + found;
        let from = trailing_cell(&text[..idx]);
        let to = leading_cell(&text[idx + 2..]);
        if let (Some(from), Some(to)) = (from, to) {
            return Some(Move::new(from, to));
        }
        offset = idx + 2;
    }
    None
}

fn token_at(grid: &[Vec<CellToken>], pos: Position) -> CellToken {
    grid[usize::from(pos.row())][usize::from(pos.col())]
}

/// Derives the move that turns `before` into `after` for `side`.
///
/// Exactly one cell must lose a `side` piece and exactly one must gain one.
/// The source must end up empty, the destination must hold a moved `side`
/// piece and every other cell must be unchanged; anything else is rejected.
pub fn diff_boards(before: &Board, after: &[Vec<CellToken>], side: Side) -> Result<Move, String> {
    if after.len() != 3 || after.iter().any(|row| row.len() != 3) {
        return Err("board must be 3x3".to_string());
    }
    let mut vacated = Vec::new();
    let mut arrived = Vec::new();
    for pos in Position::ALL {
        let old = before.get(pos).owner == Some(side);
        let new = token_at(after, pos).owner() == Some(side);
        match (old, new) {
            (true, false) => vacated.push(pos),
            (false, true) => arrived.push(pos),
            _ => {}
        }
    }
    let (from, to) = match (vacated.as_slice(), arrived.as_slice()) {
        ([from], [to]) => (*from, *to),
        _ => {
            return Err(format!(
                "board differs in {} vacated and {} new cells for {}",
                vacated.len(),
                arrived.len(),
                side
            ));
        }
    };

    let landed = CellToken::from(Cell::moved(side));
    for pos in Position::ALL {
        let expected = if pos == from {
            CellToken::Empty
        } else if pos == to {
            landed
        } else {
            CellToken::from(before.get(pos))
        };
        let found = token_at(after, pos);
        if found != expected {
            return Err(format!("cell {pos} holds {found:?}, expected {expected:?}"));
        }
    }
    Ok(Move::new(from, to))
}

/// Parses raw reply text into a proposed move.
///
/// Accepts the JSON reply (optionally wrapped in markdown fences) or the
/// plain `r,c -> r,c` form.
#[instrument(skip(text, before), fields(len = text.len()))]
pub fn parse_reply(text: &str, before: &Board, side: Side) -> Result<ParsedReply, String> {
    if let Some(json) = json_slice(text) {
        match serde_json::from_str::<OracleReply>(json) {
            Ok(reply) => {
                let mv = match (reply.mv, &reply.board) {
                    (Some(mv), _) => Move::new(to_position(mv.from)?, to_position(mv.to)?),
                    (None, Some(board)) => diff_boards(before, board, side)?,
                    (None, None) => return Err("reply carries neither move nor board".to_string()),
                };
                return Ok(ParsedReply {
                    mv,
                    reason: reply.reason,
                });
            }
            Err(e) => debug!(error = %e, "Reply is not the JSON format, trying arrow form"),
        }
    }

    parse_arrow_move(text)
        .map(|mv| ParsedReply { mv, reason: None })
        .ok_or_else(|| {
            let preview: String = text.chars().take(80).collect();
            format!("no move found in reply: {preview:?}")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(r: u8, c: u8) -> Position {
        Position::new(r, c).unwrap()
    }

    #[test]
    fn test_fenced_json_move() {
        let text = "```json\n{\"move\": {\"from\": {\"row\": 1, \"col\": 0}, \"to\": {\"row\": 1, \"col\": 1}}, \"reason\": \"center\"}\n```";
        let parsed = parse_reply(text, &Board::initial(), Side::P2).unwrap();
        assert_eq!(parsed.mv, Move::new(pos(1, 0), pos(1, 1)));
        assert_eq!(parsed.reason.as_deref(), Some("center"));
    }

    #[test]
    fn test_off_board_cell_rejected() {
        let text = r#"{"move": {"from": {"row": 3, "col": 0}, "to": {"row": 1, "col": 1}}}"#;
        assert!(parse_reply(text, &Board::initial(), Side::P2).is_err());
    }

    #[test]
    fn test_arrow_forms() {
        assert_eq!(parse_arrow_move("I play 0,0 -> 0,1."), Some(Move::new(pos(0, 0), pos(0, 1))));
        assert_eq!(parse_arrow_move("(2,0)->(2,1)"), Some(Move::new(pos(2, 0), pos(2, 1))));
        assert_eq!(parse_arrow_move("-> nothing 1,1"), None);
        let parsed = parse_reply("Move: 1,0 -> 1,1", &Board::initial(), Side::P2).unwrap();
        assert_eq!(parsed.mv, Move::new(pos(1, 0), pos(1, 1)));
    }

    #[test]
    fn test_board_diff() {
        let before = Board::initial();
        let mut after = board_tokens(&before);
        after[2][0] = CellToken::Empty;
        after[2][1] = CellToken::P2Moved;
        assert_eq!(diff_boards(&before, &after, Side::P2), Ok(Move::new(pos(2, 0), pos(2, 1))));

        let json = serde_json::json!({ "board": after, "reason": "advance" }).to_string();
        let parsed = parse_reply(&json, &before, Side::P2).unwrap();
        assert_eq!(parsed.mv, Move::new(pos(2, 0), pos(2, 1)));
    }

    #[test]
    fn test_board_diff_rejects_two_moves() {
        let before = Board::initial();
        let mut after = board_tokens(&before);
        after[0][0] = CellToken::Empty;
        after[1][0] = CellToken::Empty;
        after[0][1] = CellToken::P2Moved;
        after[1][1] = CellToken::P2Moved;
        assert!(diff_boards(&before, &after, Side::P2).is_err());
        assert!(diff_boards(&before, &after[..2], Side::P2).is_err());
    }

    #[test]
    fn test_arrow_rejects_multi_digit_cells() {
        assert_eq!(parse_arrow_move("10,0 -> 0,1"), None);
        assert_eq!(parse_arrow_move("0,0 -> 0,12"), None);
        assert_eq!(parse_arrow_move("(0,0) -> (0,1)2"), Some(Move::new(pos(0, 0), pos(0, 1))));
        assert!(parse_reply("I move 1,0 -> 1,12", &Board::initial(), Side::P2).is_err());
        assert!(parse_reply("I move 21,0 -> 1,1", &Board::initial(), Side::P2).is_err());
    }

    #[test]
    fn test_arrow_skips_unusable_arrow() {
        let text = "not 1,0 -> 1,12 but 1,0 -> 1,1";
        assert_eq!(parse_arrow_move(text), Some(Move::new(pos(1, 0), pos(1, 1))));
    }

    #[test]
    fn test_board_diff_rejects_opponent_changes() {
        let before = Board::initial();
        let mut after = board_tokens(&before);
        after[1][0] = CellToken::Empty;
        after[1][1] = CellToken::P2Moved;
        after[0][2] = CellToken::Empty;
        after[2][2] = CellToken::Empty;
        assert!(diff_boards(&before, &after, Side::P2).is_err());

        let json = serde_json::json!({ "board": after }).to_string();
        assert!(parse_reply(&json, &before, Side::P2).is_err());
    }

    #[test]
    fn test_board_diff_requires_moved_destination() {
        let before = Board::initial();
        let mut after = board_tokens(&before);
        after[1][0] = CellToken::Empty;
        after[1][1] = CellToken::P2;
        assert!(diff_boards(&before, &after, Side::P2).is_err());

        after[1][1] = CellToken::P2Moved;
        after[0][0] = CellToken::P2Moved;
        assert!(diff_boards(&before, &after, Side::P2).is_err());
    }

    #[test]
    fn test_empty_reply() {
        assert!(parse_reply("{}", &Board::initial(), Side::P1).is_err());
        assert!(parse_reply("no idea", &Board::initial(), Side::P1).is_err());
    }
}
