//! Survival sessions fed by driver events.

use std::sync::Arc;
use std::time::Duration;
use tacticross::{
    DriverCommand, LocalPlayer, MatchDriver, MatchEvent, MoveSource, SurvivalSession, SurvivalUpdate,
};
use tacticross_core::survival::{BASE_AI_HP, PLAYER_MAX_HP};
use tacticross_core::{Difficulty, MovementRule, PowerUp, RoundsWon, Side, SurvivalStatus};
use tokio::sync::mpsc;

fn round_over(winner: Option<Side>) -> MatchEvent {
    MatchEvent::RoundOver {
        winner,
        rounds_won: RoundsWon::default(),
    }
}

#[test]
fn test_human_round_win_damages_ai_and_crosses() {
    let mut session = SurvivalSession::new(Side::P1, Difficulty::Medium, Some(3));

    let step = session.on_event(&round_over(Some(Side::P1)));

    let [SurvivalUpdate::Damage(damage), SurvivalUpdate::Crossed(Side::P1), ..] = step.updates.as_slice() else {
        panic!("unexpected updates {:?}", step.updates);
    };
    assert_eq!(damage.target, Side::P2);
    assert!((200..500).contains(&damage.amount));
    assert_eq!(step.command, None);
    assert_eq!(*session.run().player_hp(), PLAYER_MAX_HP);
    assert!(session.animation().sprites().iter().any(|s| s.side == Side::P1 && s.finished));
}

#[test]
fn test_stalemate_round_changes_nothing() {
    let mut session = SurvivalSession::new(Side::P1, Difficulty::Hard, Some(3));

    let step = session.on_event(&round_over(None));

    assert!(step.updates.is_empty());
    assert_eq!(step.command, None);
    assert_eq!(*session.run().ai_hp(), BASE_AI_HP);
}

#[test]
fn test_defeating_ai_takes_power_up() {
    let mut session = SurvivalSession::new(Side::P2, Difficulty::Easy, Some(8)).with_power_up(Some(PowerUp::Hammer));

    let mut power_up = None;
    for _ in 0..BASE_AI_HP {
        let step = session.on_event(&round_over(Some(Side::P2)));
        power_up = step
            .updates
            .iter()
            .find_map(|u| matches!(u, SurvivalUpdate::PowerUp { .. }).then_some(*u));
        if power_up.is_some() {
            break;
        }
    }

    let Some(SurvivalUpdate::PowerUp { choice, round, .. }) = power_up else {
        panic!("AI never fell");
    };
    assert_eq!(choice, PowerUp::Hammer);
    assert_eq!(round, 2);
    assert_eq!(*session.run().status(), SurvivalStatus::Fighting);
}

#[test]
fn test_defeat_stops_the_driver() {
    let mut session = SurvivalSession::new(Side::P1, Difficulty::Hard, Some(5));

    let mut last = None;
    for _ in 0..20 {
        let step = session.on_event(&round_over(Some(Side::P2)));
        if step.command.is_some() {
            last = Some(step);
            break;
        }
    }

    let step = last.expect("run never ended");
    assert_eq!(step.command, Some(DriverCommand::Quit));
    assert!(matches!(
        step.updates.last(),
        Some(SurvivalUpdate::RunOver { survived: 0, best: 1 })
    ));
    assert_eq!(session.on_event(&MatchEvent::GameOver { winner: Side::P2 }).command, None);
}

#[test]
fn test_decided_match_is_reset() {
    let mut session = SurvivalSession::new(Side::P1, Difficulty::Medium, Some(2));
    session.on_event(&round_over(Some(Side::P1)));

    let step = session.on_event(&MatchEvent::GameOver { winner: Side::P1 });

    assert_eq!(step.command, Some(DriverCommand::ResetMatch));
    assert!(session.animation().sprites().iter().all(|s| !s.finished));
}

#[tokio::test]
async fn test_run_plays_until_defeat() {
    let rule = MovementRule::Adjacency;
    let stand_in: Arc<dyn MoveSource> = Arc::new(LocalPlayer::for_difficulty(Difficulty::Easy, rule, Some(11), 6));
    let ai: Arc<dyn MoveSource> = Arc::new(LocalPlayer::for_difficulty(Difficulty::Hard, rule, Some(12), 6));
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let limit = 3000;
    let mut driver = MatchDriver::new(rule, Some(stand_in), Some(ai), event_tx)
        .with_auto_advance(Duration::ZERO)
        .with_exit_on_game_over(false)
        .with_ply_limit(limit);
    let task = tokio::spawn(async move { driver.run(command_rx).await });

    let mut session = SurvivalSession::new(Side::P1, Difficulty::Hard, Some(13));
    while let Some(event) = events.recv().await {
        if let Some(command) = session.on_event(&event).command {
            // The driver may already have stopped at the ply limit.
            let _ = command_tx.send(command);
        }
    }

    let summary = task.await.unwrap().unwrap();
    if summary.plies < limit {
        assert_eq!(*session.run().status(), SurvivalStatus::Defeated);
        assert_eq!(*session.run().player_hp(), 0);
    }
}
