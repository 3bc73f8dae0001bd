//! End-to-end scenarios through the public API.

use tacticross_core::{
    AiResolution, AiSeats, Board, Cell, ClickOutcome, Difficulty, Match, MoveOutcome, MovementRule,
    Position, RoundsWon, Side, strategy_for, winner,
};

fn pos(r: u8, c: u8) -> Position {
    Position::new(r, c).unwrap()
}

#[test]
fn test_first_move_marks_destination_moved() {
    let mut game = Match::new(MovementRule::Adjacency, AiSeats::Nobody);
    assert_eq!(game.click(pos(0, 2)), ClickOutcome::Selected(pos(0, 2)));
    let outcome = game.click(pos(0, 1));
    assert_eq!(outcome, ClickOutcome::Moved(MoveOutcome::Continue { next: Side::P2 }));

    let board = game.board();
    assert_eq!(board.get(pos(0, 1)), Cell::moved(Side::P1));
    assert_eq!(board.get(pos(0, 2)), Cell::EMPTY);
    assert_eq!(winner(board), None);
}

#[test]
fn test_third_moved_piece_completes_row() {
    let board = Board::initial()
        .with(pos(0, 0), Cell::moved(Side::P1))
        .with(pos(0, 1), Cell::moved(Side::P1))
        .with(pos(0, 2), Cell::EMPTY)
        .with(pos(1, 1), Cell::unmoved(Side::P2))
        .with(pos(1, 0), Cell::EMPTY)
        .with(pos(2, 2), Cell::unmoved(Side::P2))
        .with(pos(2, 1), Cell::unmoved(Side::P2))
        .with(pos(2, 0), Cell::EMPTY);
    let mut game = Match::from_parts(
        MovementRule::Adjacency,
        AiSeats::Nobody,
        board,
        Side::P1,
        RoundsWon::default(),
    );
    game.click(pos(1, 2));
    let outcome = game.click(pos(0, 2));
    assert!(matches!(
        outcome,
        ClickOutcome::Moved(MoveOutcome::RoundWon { winner: Side::P1, .. })
    ));
    assert_eq!(winner(game.board()), Some(Side::P1));
}

#[test]
fn test_game_over_blocks_clicks_until_reset() {
    let board = Board::parse("1* 1* .  2 . 1  2 . 2").unwrap();
    let mut game = Match::from_parts(
        MovementRule::Adjacency,
        Some(Side::P2),
        board,
        Side::P1,
        RoundsWon { p1: 1, p2: 0 },
    );
    game.click(pos(1, 2));
    game.click(pos(0, 2));
    let snapshot = game.snapshot();
    assert_eq!(snapshot.game_winner, Some(Side::P1));
    assert_eq!(snapshot.rounds_won.p1, 2);

    for p in Position::ALL {
        assert_eq!(game.click(p), ClickOutcome::Ignored);
    }
    assert!(game.request_ai_move().is_none());

    game.reset_match();
    assert_eq!(game.click(pos(0, 2)), ClickOutcome::Selected(pos(0, 2)));
}

#[test]
fn test_full_match_against_each_difficulty() {
    for rule in [MovementRule::Adjacency, MovementRule::FullReach] {
        for difficulty in [Difficulty::Easy, Difficulty::Medium] {
            let mut human = strategy_for(Difficulty::Easy, rule, Some(11));
            let mut ai = strategy_for(difficulty, rule, Some(5));
            let mut game = Match::new(rule, Some(Side::P2));

            for _ in 0..2000 {
                if game.game_winner().is_some() {
                    break;
                }
                if !game.phase().is_playing() {
                    game.next_round().unwrap();
                    continue;
                }
                if let Some(request) = game.request_ai_move() {
                    let reply = ai.choose(&request.board, request.side);
                    let resolution = game.resolve_ai_move(request.id, reply);
                    assert!(
                        matches!(resolution, AiResolution::Applied(_) | AiResolution::Stalemate),
                        "{resolution:?}"
                    );
                } else {
                    let mv = human.choose(game.board(), Side::P1).unwrap();
                    game.submit_move(Side::P1, mv).unwrap();
                }
            }

            let rounds = game.rounds_won();
            assert!(rounds.p1 <= 2 && rounds.p2 <= 2);
            if let Some(w) = game.game_winner() {
                assert_eq!(rounds.get(w), 2);
            }
        }
    }
}
