//! Match driver with scripted move sources.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tacticross::{DriverCommand, LocalPlayer, MatchDriver, MatchEvent, MatchSummary, MoveSource, Proposal};
use tacticross_core::{
    AiRequest, Difficulty, Move, MovementRule, Position, Side, is_legal, legal_moves,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

fn pos(r: u8, c: u8) -> Position {
    Position::new(r, c).unwrap()
}

/// Plays the first legal move after a delay.
struct SlowSource(Duration);

#[async_trait]
impl MoveSource for SlowSource {
    async fn propose(&self, request: &AiRequest) -> Proposal {
        tokio::time::sleep(self.0).await;
        Proposal::of(legal_moves(&request.board, request.side, MovementRule::Adjacency).first().copied())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Always proposes moving one of the opponent's pieces.
struct CheatingSource;

#[async_trait]
impl MoveSource for CheatingSource {
    async fn propose(&self, request: &AiRequest) -> Proposal {
        let theirs = request.board.pieces(request.side.opponent()).next();
        let empty = request.board.empties().next();
        Proposal {
            mv: theirs.zip(empty).map(|(from, to)| Move::new(from, to)),
            note: Some("cheating".to_string()),
        }
    }

    fn name(&self) -> &str {
        "cheater"
    }
}

struct Harness {
    commands: mpsc::UnboundedSender<DriverCommand>,
    events: mpsc::UnboundedReceiver<MatchEvent>,
    task: JoinHandle<anyhow::Result<MatchSummary>>,
}

impl Harness {
    fn human_vs(ai: Arc<dyn MoveSource>) -> Self {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let mut driver = MatchDriver::new(MovementRule::Adjacency, None, Some(ai), event_tx);
        let task = tokio::spawn(async move { driver.run(command_rx).await });
        Self { commands, events, task }
    }

    /// Waits for the first event matching `pred`, failing after two seconds.
    async fn expect(&mut self, pred: impl Fn(&MatchEvent) -> bool) -> MatchEvent {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let event = self.events.recv().await.expect("driver hung up");
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("timed out waiting for event")
    }

    async fn quit(self) -> MatchSummary {
        self.commands.send(DriverCommand::Quit).unwrap();
        self.task.await.unwrap().unwrap()
    }
}

#[tokio::test]
async fn test_late_answer_after_reset_is_dropped() {
    let mut h = Harness::human_vs(Arc::new(SlowSource(Duration::from_millis(200))));

    h.commands
        .send(DriverCommand::Move(Move::new(pos(0, 2), pos(0, 1))))
        .unwrap();
    h.expect(|e| matches!(e, MatchEvent::AiThinking { side: Side::P2, .. }))
        .await;
    h.commands.send(DriverCommand::ResetMatch).unwrap();

    let event = h.expect(|e| matches!(e, MatchEvent::AiResponseDropped { .. })).await;
    assert_eq!(event, MatchEvent::AiResponseDropped { id: 1 });

    let summary = h.quit().await;
    assert_eq!(summary.plies, 1);
    assert!(!summary.finished);
}

#[tokio::test]
async fn test_clicks_move_then_ai_answers() {
    let mut h = Harness::human_vs(Arc::new(SlowSource(Duration::ZERO)));

    h.commands.send(DriverCommand::Click(pos(1, 2))).unwrap();
    h.commands.send(DriverCommand::Click(pos(1, 1))).unwrap();

    let human = h.expect(|e| matches!(e, MatchEvent::MoveMade { side: Side::P1, .. })).await;
    assert_eq!(
        human,
        MatchEvent::MoveMade {
            side: Side::P1,
            mv: Move::new(pos(1, 2), pos(1, 1)),
            note: None
        }
    );
    h.expect(|e| matches!(e, MatchEvent::MoveMade { side: Side::P2, .. }))
        .await;
    let MatchEvent::StateChanged(snapshot) = h.expect(|e| matches!(e, MatchEvent::StateChanged(_))).await else {
        unreachable!()
    };
    assert_eq!(snapshot.current_player, Side::P1);

    assert_eq!(h.quit().await.plies, 2);
}

#[tokio::test]
async fn test_illegal_ai_answer_is_replaced() {
    let mut h = Harness::human_vs(Arc::new(CheatingSource));

    h.commands
        .send(DriverCommand::Move(Move::new(pos(2, 2), pos(2, 1))))
        .unwrap();

    h.expect(|e| matches!(e, MatchEvent::Fallback { side: Side::P2, .. }))
        .await;
    let MatchEvent::MoveMade { mv, note, .. } =
        h.expect(|e| matches!(e, MatchEvent::MoveMade { side: Side::P2, .. })).await
    else {
        unreachable!()
    };
    assert_eq!(note.as_deref(), Some("fallback"));
    let board = tacticross_core::Board::initial()
        .with(pos(2, 2), tacticross_core::Cell::EMPTY)
        .with(pos(2, 1), tacticross_core::Cell::moved(Side::P1));
    assert!(is_legal(&board, Side::P2, mv, MovementRule::Adjacency));

    h.quit().await;
}

#[tokio::test]
async fn test_bad_human_input_is_reported() {
    let mut h = Harness::human_vs(Arc::new(SlowSource(Duration::ZERO)));

    h.commands
        .send(DriverCommand::Move(Move::new(pos(0, 0), pos(0, 1))))
        .unwrap();
    h.expect(|e| matches!(e, MatchEvent::InputRejected { .. })).await;

    h.commands.send(DriverCommand::NextRound).unwrap();
    let MatchEvent::InputRejected { reason } = h.expect(|e| matches!(e, MatchEvent::InputRejected { .. })).await
    else {
        unreachable!()
    };
    assert!(reason.contains("in progress"), "{reason}");

    assert_eq!(h.quit().await.plies, 0);
}

#[tokio::test]
async fn test_ai_against_ai_runs_to_completion() {
    let rule = MovementRule::Adjacency;
    let p1: Arc<dyn MoveSource> = Arc::new(LocalPlayer::for_difficulty(Difficulty::Easy, rule, Some(5), 6));
    let p2: Arc<dyn MoveSource> = Arc::new(LocalPlayer::for_difficulty(Difficulty::Medium, rule, Some(6), 6));
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    drop(command_tx);

    let mut driver = MatchDriver::new(rule, Some(p1), Some(p2), event_tx)
        .with_auto_advance(Duration::ZERO)
        .with_ply_limit(500);
    let summary = driver.run(command_rx).await.unwrap();
    drop(driver);

    let mut moves = 0;
    let mut game_over = None;
    while let Some(event) = events.recv().await {
        match event {
            MatchEvent::MoveMade { side, mv, .. } => {
                moves += 1;
                assert!(mv.from != mv.to, "{side} passed");
            }
            MatchEvent::GameOver { winner } => game_over = Some(winner),
            MatchEvent::InputRejected { .. } | MatchEvent::AiResponseDropped { .. } => {
                panic!("unexpected {event:?}")
            }
            _ => {}
        }
    }

    assert_eq!(moves, summary.plies);
    assert_eq!(game_over, summary.winner);
    if let Some(winner) = summary.winner {
        assert_eq!(summary.rounds_won.get(winner), 2);
    } else {
        assert_eq!(summary.plies, 500);
    }
}
