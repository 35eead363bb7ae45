//! Engine results vs. a plain negamax with no caches and no cutoffs.

use connect4_core::{Cell, Color, GameConfig, Outcome, PackedBoard, Player};
use connect4_solver::{SearchContext, SearchEngine, SearchError};

fn small() -> GameConfig {
    GameConfig::new(4, 4, 3).unwrap()
}

/// Exact game value for the side to move: 1 win, 0 draw, -1 loss.
fn reference_value(board: &PackedBoard) -> i32 {
    let mut best = i32::MIN;
    for cell in board.legal_cells() {
        let mut next = *board;
        next.play(cell.column).unwrap();
        let score = match next.outcome() {
            Outcome::Undecided => -reference_value(&next),
            Outcome::Draw => 0,
            Outcome::Win(_) => 1,
        };
        best = best.max(score);
    }
    best
}

/// Build a board from (column, colour) drops and set the side to move.
fn board_from(config: GameConfig, drops: &[(u8, Color)], to_move: u8) -> PackedBoard {
    let mut board = PackedBoard::with_config(config);
    for &(column, color) in drops {
        let row = board.fill_count(column).unwrap();
        board.place(Cell::new(column, row), color).unwrap();
    }
    board.set_turn(to_move).unwrap();
    board
}

#[test]
fn test_completes_own_run() {
    // Red (to move) has (1,0),(2,0); both ends of the row are open.
    let board = board_from(
        small(),
        &[(1, Color::Red), (1, Color::Yellow), (2, Color::Red), (2, Color::Yellow)],
        1,
    );
    let mut engine = SearchEngine::new(small());
    let rec = engine.recommend(&board).unwrap();
    assert_eq!(rec.score, 1.0);

    let mut after = board;
    after.place(rec.cell, Color::Red).unwrap();
    assert_eq!(after.outcome(), Outcome::Win(Player::One));
}

#[test]
fn test_cannot_escape_double_threat() {
    // Yellow holds (1,0),(2,0) with (0,0) and (3,0) both open; Red to move
    // can block only one end and has no immediate win of its own.
    let board = board_from(
        small(),
        &[(1, Color::Yellow), (2, Color::Yellow), (1, Color::Red), (2, Color::Red)],
        1,
    );
    let mut engine = SearchEngine::new(small());
    let mut context = SearchContext::new();
    engine.best_move(&board, &mut context).unwrap();

    assert_eq!(context.best_score(), -1.0);
    assert!(context.best_move().is_some());
    assert_eq!(reference_value(&board), -1);

    // Every individual reply loses as well.
    for cell in board.legal_cells() {
        let mut next = board;
        next.place(cell, Color::Red).unwrap();
        next.set_player(Player::Two);
        let mut reply = SearchContext::new();
        engine.best_move(&next, &mut reply).unwrap();
        assert!(-reply.best_score() <= 0.0, "move {:?} should not win", cell);
    }
}

#[test]
fn test_matches_reference_on_midgame_positions() {
    // Eight-chip openings leave a small enough tree for the reference search.
    let openings = [
        "12341234", "21433412", "12423434", "33411232", "23224324", "33324111", "22144324",
    ];
    let mut engine = SearchEngine::new(small());

    for moves in openings {
        let board = PackedBoard::from_moves(small(), moves).unwrap();
        assert_eq!(board.outcome(), Outcome::Undecided, "opening {}", moves);
        let expected = reference_value(&board);
        let rec = engine.recommend(&board).unwrap();
        assert_eq!(rec.score, expected as f32, "opening {}", moves);

        // A fresh engine must agree with one that reused earlier sessions.
        let mut fresh = SearchEngine::new(small());
        assert_eq!(fresh.recommend(&board).unwrap().score, rec.score, "opening {}", moves);
    }
}

#[test]
fn test_recommended_move_keeps_value() {
    let board = PackedBoard::from_moves(small(), "2132").unwrap();
    let mut engine = SearchEngine::new(small());
    let rec = engine.recommend(&board).unwrap();

    let mut next = board;
    next.play(rec.column()).unwrap();
    let value_after = match next.outcome() {
        Outcome::Undecided => -reference_value(&next),
        Outcome::Draw => 0,
        Outcome::Win(_) => 1,
    };
    assert_eq!(value_after as f32, rec.score);
}

#[test]
fn test_repeat_query_hits_cache() {
    let board = PackedBoard::from_moves(small(), "1234").unwrap();
    let mut engine = SearchEngine::new(small());
    let first = engine.recommend(&board).unwrap();
    let nodes = engine.stats.nodes_searched;
    let table = engine.transposition_len();

    let second = engine.recommend(&board).unwrap();
    assert_eq!(first, second);
    // Every candidate is answered from the transposition cache.
    assert_eq!(engine.stats.nodes_searched, nodes + 1);
    assert_eq!(engine.transposition_len(), table);
    assert!(engine.stats.cache_hits > 0);
}

#[test]
fn test_narrow_board_score() {
    // 3x2, connect 2: small enough to search from the empty board.
    let config = GameConfig::new(3, 2, 2).unwrap();
    let board = PackedBoard::with_config(config);
    let mut engine = SearchEngine::new(config);
    let rec = engine.recommend(&board).unwrap();
    assert_eq!(rec.score, reference_value(&board) as f32);
}

#[test]
fn test_game_over_is_reported() {
    let board = PackedBoard::from_moves(small(), "1212 1").unwrap();
    let mut engine = SearchEngine::new(small());
    assert_eq!(
        engine.recommend(&board),
        Err(SearchError::GameOver(Outcome::Win(Player::One)))
    );
}
