//! Game rules: move legality and win detection.

pub mod movement;
pub mod win;

pub use movement::{is_legal, legal_moves, validate};
pub use win::{LINES, creates_threat, threat_lines, winner, winning_moves};
