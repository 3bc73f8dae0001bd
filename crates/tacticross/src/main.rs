//! Tacticross - terminal front end.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tacticross::cli::{Cli, Command};
use tacticross::players::spawn_stdin_reader;
use tacticross::{
    ConfigOverrides, DriverCommand, MatchDriver, MatchEvent, MatchSummary, MoveSource, RemoteOracle,
    SurvivalSession, SurvivalUpdate, TacticrossConfig, seat_for,
};
use tacticross_core::{Board, Difficulty, PowerUp, Side, Strategy, Tournament, strategy_with_depth};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    let config = TacticrossConfig::load_or_default(&cli.game.config)
        .with_context(|| format!("loading {}", cli.game.config.display()))?
        .with_overrides(&cli.game.overrides());

    match cli.command {
        Command::Play { round_delay_ms } => run_play(&config, Duration::from_millis(round_delay_ms)).await,
        Command::Survive {
            round_delay_ms,
            power_up,
        } => run_survive(&config, Duration::from_millis(round_delay_ms), power_up).await,
        Command::Simulate {
            matches,
            p1,
            p2,
            max_plies,
        } => run_simulate(&config, matches, p1, p2, max_plies).await,
        Command::Tournament { names, max_plies } => run_tournament(&config, names, max_plies).await,
        Command::Suggest { side } => run_suggest(&config, side).await,
    }
}

/// Logs go to stderr so stdout carries only the game.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn with_difficulty(config: &TacticrossConfig, difficulty: Option<Difficulty>) -> TacticrossConfig {
    config.clone().with_overrides(&ConfigOverrides {
        difficulty,
        ..ConfigOverrides::default()
    })
}

fn print_event(event: &MatchEvent, human: Side) {
    match event {
        MatchEvent::StateChanged(snapshot) => {
            println!("\n{}", snapshot.board.display());
            if let Some(selected) = snapshot.selected {
                println!("Selected {selected}");
            }
            if snapshot.round_winner.is_none() && snapshot.current_player == human && !snapshot.ai_thinking {
                println!("Your move ({human}): r,c to select, r,c r,c to move");
            }
        }
        MatchEvent::AiThinking { source, .. } => println!("{source} is thinking..."),
        MatchEvent::MoveMade { side, mv, note } => match note {
            Some(note) => println!("{side} plays {mv} ({note})"),
            None => println!("{side} plays {mv}"),
        },
        MatchEvent::RoundOver { winner, rounds_won } => {
            let result = winner.map_or_else(|| "Stalemate".to_string(), |w| format!("{w} wins the round"));
            println!("{result}. Rounds: p1 {} - p2 {}", rounds_won.p1, rounds_won.p2);
        }
        MatchEvent::GameOver { winner } => {
            let verdict = if *winner == human { "You win the match!" } else { "The AI wins the match." };
            println!("{verdict} Type reset for a new match or quit to leave.");
        }
        MatchEvent::AiResponseDropped { id } => println!("(late AI answer #{id} ignored)"),
        MatchEvent::InputRejected { reason } => println!("Not accepted: {reason}"),
        MatchEvent::Fallback { reason, .. } => println!("(AI answer unusable: {reason})"),
    }
}

/// Human against the configured AI over stdin.
#[instrument(skip(config), fields(rule = %config.movement_rule(), ai_side = %config.ai_side()))]
async fn run_play(config: &TacticrossConfig, round_delay: Duration) -> Result<()> {
    let ai_side = *config.ai_side();
    let human = ai_side.opponent();
    let seat = seat_for(config).context("creating AI seat")?;
    let (p1, p2) = match ai_side {
        Side::P1 => (Some(seat), None),
        Side::P2 => (None, Some(seat)),
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel::<DriverCommand>();
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event, human);
        }
    });
    let reader = spawn_stdin_reader(command_tx);

    println!("Tacticross: you are {human}. A line only counts once all three of its pieces have moved.");
    let mut driver = MatchDriver::new(*config.movement_rule(), p1, p2, event_tx)
        .with_auto_advance(round_delay)
        .with_exit_on_game_over(false);
    let summary = driver.run(command_rx).await?;
    drop(driver);

    reader.abort();
    printer.await.context("event printer failed")?;
    info!(winner = ?summary.winner, "Session over");
    Ok(())
}

fn print_survival(update: &SurvivalUpdate, session: &SurvivalSession) {
    let run = session.run();
    match update {
        SurvivalUpdate::Damage(damage) if damage.target == *run.human() => {
            println!("You take {} damage. HP {}", damage.amount, run.player_hp());
        }
        SurvivalUpdate::Damage(damage) => {
            println!("You deal {} damage. AI HP {}/{}", damage.amount, run.ai_hp(), run.ai_max_hp());
        }
        SurvivalUpdate::Crossed(side) => println!("A {side} creature crosses the map."),
        SurvivalUpdate::PowerUp { choice, round, map } => {
            println!("Opponent down! Power-up: {choice}. Survival round {round} on the {map} map.");
        }
        SurvivalUpdate::RunOver { survived, best } => {
            println!("You fall after clearing {survived} rounds. Best streak: round {best}.");
        }
    }
}

/// Human against an endless ladder of AI opponents.
#[instrument(skip(config), fields(difficulty = %config.difficulty()))]
async fn run_survive(config: &TacticrossConfig, round_delay: Duration, power_up: Option<PowerUp>) -> Result<()> {
    let ai_side = *config.ai_side();
    let human = ai_side.opponent();
    let seat = seat_for(config).context("creating AI seat")?;
    let (p1, p2) = match ai_side {
        Side::P1 => (Some(seat), None),
        Side::P2 => (None, Some(seat)),
    };

    let mut session = SurvivalSession::new(human, *config.difficulty(), *config.seed()).with_power_up(power_up);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel::<DriverCommand>();
    // Weak so that stdin closing still ends the driver.
    let session_commands = command_tx.downgrade();
    let follower = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event, human);
            let step = session.on_event(&event);
            for update in &step.updates {
                print_survival(update, &session);
            }
            if let Some(command) = step.command {
                let Some(commands) = session_commands.upgrade() else {
                    break;
                };
                if commands.send(command).is_err() {
                    break;
                }
            }
        }
        session
    });
    let reader = spawn_stdin_reader(command_tx);

    println!(
        "Survival: you are {human} with {} HP. Win rounds to wear the AI down.",
        tacticross_core::survival::PLAYER_MAX_HP
    );
    let mut driver = MatchDriver::new(*config.movement_rule(), p1, p2, event_tx)
        .with_auto_advance(round_delay)
        .with_exit_on_game_over(false);
    driver.run(command_rx).await?;
    drop(driver);

    reader.abort();
    let session = follower.await.context("survival follower failed")?;
    info!(round = *session.run().round(), best = *session.run().best_streak(), "Run finished");
    Ok(())
}

async fn play_ai_match(
    config: &TacticrossConfig,
    p1: Arc<dyn MoveSource>,
    p2: Arc<dyn MoveSource>,
    max_plies: u32,
) -> Result<MatchSummary> {
    let (event_tx, _event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    drop(command_tx);
    let mut driver = MatchDriver::new(*config.movement_rule(), Some(p1), Some(p2), event_tx)
        .with_auto_advance(Duration::ZERO)
        .with_ply_limit(max_plies);
    driver.run(command_rx).await
}

fn seeded(config: &TacticrossConfig, offset: u64) -> TacticrossConfig {
    let seed = config.seed().map_or(offset, |seed| seed.wrapping_add(offset));
    config.clone().with_overrides(&ConfigOverrides {
        seed: Some(seed),
        ..ConfigOverrides::default()
    })
}

/// AI against AI, `matches` times.
#[instrument(skip(config))]
async fn run_simulate(
    config: &TacticrossConfig,
    matches: u32,
    p1: Option<Difficulty>,
    p2: Option<Difficulty>,
    max_plies: u32,
) -> Result<()> {
    let p1_config = with_difficulty(config, p1);
    let p2_config = with_difficulty(config, p2);
    let mut tally: BTreeMap<String, u32> = BTreeMap::new();
    let mut total_plies = 0u64;

    for n in 0..u64::from(matches) {
        let first = seat_for(&seeded(&p1_config, 2 * n)).context("creating P1 seat")?;
        let second = seat_for(&seeded(&p2_config, 2 * n + 1)).context("creating P2 seat")?;
        let summary = play_ai_match(config, first, second, max_plies).await?;
        total_plies += u64::from(summary.plies);
        let key = summary.winner.map_or_else(|| "unfinished".to_string(), |w| w.to_string());
        *tally.entry(key).or_default() += 1;
        info!(match_no = n + 1, winner = ?summary.winner, plies = summary.plies, "Match done");
    }

    println!(
        "{} ({}) vs {} ({}) under {} over {matches} matches:",
        Side::P1,
        p1_config.difficulty(),
        Side::P2,
        p2_config.difficulty(),
        config.movement_rule()
    );
    for (outcome, count) in &tally {
        println!("  {outcome:<10} {count}");
    }
    if matches > 0 {
        println!("  average plies {:.1}", total_plies as f64 / f64::from(matches));
    }
    Ok(())
}

/// AI-only single-elimination bracket.
#[instrument(skip(config, names))]
async fn run_tournament(config: &TacticrossConfig, names: Vec<String>, max_plies: u32) -> Result<()> {
    let mut tournament = Tournament::new(names);
    println!("Entrants:");
    for entrant in tournament.entrants() {
        println!("  {} {}", entrant.id, entrant.name);
    }

    let mut offset = 0u64;
    while tournament.champion().is_none() {
        let pending: Vec<_> = tournament.pending_matches().into_iter().cloned().collect();
        if pending.is_empty() {
            warn!("Bracket has no pending matches but no champion");
            break;
        }
        for bracket_match in pending {
            let Some(second) = bracket_match.second else {
                continue;
            };
            offset += 2;
            let summary = play_ai_match(
                config,
                seat_for(&seeded(config, offset)).context("creating seat")?,
                seat_for(&seeded(config, offset + 1)).context("creating seat")?,
                max_plies,
            )
            .await?;
            let winner = match summary.winner {
                Some(Side::P2) => second,
                Some(Side::P1) => bracket_match.first,
                None if summary.rounds_won.p2 > summary.rounds_won.p1 => second,
                None => bracket_match.first,
            };
            let name_of = |id: usize| tournament.entrant(id).map(|e| e.name.clone()).unwrap_or_default();
            println!(
                "Round {}: {} vs {} -> {}",
                bracket_match.round,
                name_of(bracket_match.first),
                name_of(second),
                name_of(winner)
            );
            tournament
                .record_result(bracket_match.id, winner)
                .context("recording result")?;
        }
    }

    if let Some(champion) = tournament.champion() {
        println!("Champion: {}", champion.name);
    }
    Ok(())
}

/// One move from the configured source on the opening board.
#[instrument(skip(config))]
async fn run_suggest(config: &TacticrossConfig, side: Side) -> Result<()> {
    let board = Board::initial();
    println!("{}", board.display());
    match config.ai_source() {
        tacticross::AiSource::Oracle => {
            let oracle = RemoteOracle::from_config(config).context("creating oracle")?;
            let decision = oracle.request_move(&board, side).await;
            match decision.mv {
                Some(mv) => println!("{side}: {mv} [{}]", decision.origin),
                None => println!("{side} has no legal move"),
            }
            if let Some(reason) = decision.reason {
                println!("Reason: {reason}");
            }
        }
        tacticross::AiSource::Local => {
            let mut strategy = strategy_with_depth(
                *config.difficulty(),
                *config.movement_rule(),
                *config.seed(),
                *config.search_depth(),
            );
            match strategy.choose(&board, side) {
                Some(mv) => println!("{side}: {mv} [{}]", strategy.kind()),
                None => println!("{side} has no legal move"),
            }
        }
    }
    Ok(())
}
