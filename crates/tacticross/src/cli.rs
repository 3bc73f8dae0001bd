//! Command-line interface for tacticross.

use crate::config::{AiSource, ConfigOverrides};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tacticross_core::{Difficulty, MovementRule, PowerUp, Side};

/// Tacticross - a 3x3 crossing game against local or LLM opponents
#[derive(Parser, Debug)]
#[command(name = "tacticross")]
#[command(about = "3x3 crossing board game with AI opponents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings shared by every subcommand
    #[command(flatten)]
    pub game: GameArgs,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Flags that override the config file.
#[derive(Args, Debug, Clone)]
pub struct GameArgs {
    /// Path to the TOML config file (defaults apply when it is missing)
    #[arg(short, long, global = true, default_value = "tacticross.toml")]
    pub config: PathBuf,

    /// Movement rule: adjacency or full_reach
    #[arg(long, global = true)]
    pub rule: Option<MovementRule>,

    /// AI difficulty: easy, medium or hard
    #[arg(short, long, global = true)]
    pub difficulty: Option<Difficulty>,

    /// Side the AI plays: p1 or p2
    #[arg(long, global = true)]
    pub ai_side: Option<Side>,

    /// Where AI moves come from: local or oracle
    #[arg(long, global = true)]
    pub source: Option<AiSource>,

    /// Seed for reproducible random play
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Minimax depth cap
    #[arg(long, global = true)]
    pub depth: Option<u8>,
}

impl GameArgs {
    /// The overrides these flags carry.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            movement_rule: self.rule,
            difficulty: self.difficulty,
            ai_side: self.ai_side,
            ai_source: self.source,
            seed: self.seed,
            search_depth: self.depth,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play against the AI in the terminal
    Play {
        /// Pause before the next round starts, in milliseconds
        #[arg(long, default_value = "800")]
        round_delay_ms: u64,
    },

    /// Survival: keep beating AI opponents until your HP runs out
    Survive {
        /// Pause before the next round starts, in milliseconds
        #[arg(long, default_value = "800")]
        round_delay_ms: u64,

        /// Power-up to take after each defeated opponent: heal, double_damage or hammer
        /// (chosen by HP when omitted)
        #[arg(long)]
        power_up: Option<PowerUp>,
    },

    /// Let two AIs play each other and tally the results
    Simulate {
        /// Number of matches
        #[arg(short = 'n', long, default_value = "10")]
        matches: u32,

        /// Difficulty of the P1 seat (defaults to the configured difficulty)
        #[arg(long)]
        p1: Option<Difficulty>,

        /// Difficulty of the P2 seat (defaults to the configured difficulty)
        #[arg(long)]
        p2: Option<Difficulty>,

        /// Give up on a match after this many moves
        #[arg(long, default_value = "200")]
        max_plies: u32,
    },

    /// Run a single-elimination bracket between AI entrants
    Tournament {
        /// Entrant names (2 to 8; the field is padded with AI bots)
        #[arg(required = true)]
        names: Vec<String>,

        /// Give up on a match after this many moves
        #[arg(long, default_value = "200")]
        max_plies: u32,
    },

    /// Ask the configured move source for one move on the opening board
    Suggest {
        /// Side to move
        #[arg(long, default_value = "p2")]
        side: Side,
    },
}
