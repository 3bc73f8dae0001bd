use crate::driver::DriverCommand;
use tacticross_core::{Move, Position};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Parses one line of terminal input.
///
/// `r,c` clicks a cell, `r,c r,c` (or `r,c -> r,c`) moves a piece, and
/// `next`, `reset` and `quit` control the match.
pub fn parse_command(line: &str) -> Option<DriverCommand> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return None,
        "n" | "next" => return Some(DriverCommand::NextRound),
        "r" | "reset" => return Some(DriverCommand::ResetMatch),
        "q" | "quit" | "exit" => return Some(DriverCommand::Quit),
        _ => {}
    }
    if let Some(pos) = Position::parse(line) {
        return Some(DriverCommand::Click(pos));
    }
    let cleaned = line.replace("->", " ");
    let mut parts = cleaned.split_whitespace();
    let from = Position::parse(parts.next()?)?;
    let to = Position::parse(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(DriverCommand::Move(Move::new(from, to)))
}

/// Reads commands from stdin until EOF, `quit` or the driver hangs up.
pub fn spawn_stdin_reader(commands: UnboundedSender<DriverCommand>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("Stdin closed");
                    let _ = commands.send(DriverCommand::Quit);
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    let _ = commands.send(DriverCommand::Quit);
                    break;
                }
            };
            let Some(command) = parse_command(&line) else {
                if !line.trim().is_empty() {
                    eprintln!("Unrecognized input {line:?}: use r,c | r,c r,c | next | reset | quit");
                }
                continue;
            };
            let quit = command == DriverCommand::Quit;
            if commands.send(command).is_err() || quit {
                break;
            }
        }
    })
}
