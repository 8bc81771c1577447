//! Integration tests for the block puzzle engine.
//!
//! These tests drive complete games through the public API, from an empty
//! board to game over, and through save and restore.

use blockpuzzle_core::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// First legal (slot, x, y) in slot order, then row-major anchor order
fn first_legal_move(state: &GameState) -> Option<(usize, i32, i32)> {
    state.slots().iter().enumerate().find_map(|(slot, piece)| {
        let shape = shape_for((*piece)?).ok()?;
        legal_anchors(shape, state.board())
            .next()
            .map(|(x, y)| (slot, x, y))
    })
}

/// Exhaustive check used to cross-examine `can_make_move`
fn any_move_exists(state: &GameState) -> bool {
    let size = state.grid_size() as i32;
    (0..NUM_AVAILABLE_PIECES).any(|slot| {
        (0..size).any(|y| (0..size).any(|x| state.can_place_piece(slot, x, y).unwrap()))
    })
}

#[test]
fn test_fill_row_three_with_placements() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut state = GameState::from_parts(Board::new(10), [Some(0), Some(0), Some(18)], 0).unwrap();

    let first = state.place_piece(0, 0, 3, &mut rng).unwrap();
    assert!(first.placement().unwrap().cleared.is_empty());
    assert_eq!(state.score(), 5);

    let second = state.place_piece(1, 5, 3, &mut rng).unwrap();
    let placement = second.placement().unwrap();
    assert_eq!(placement.cleared.rows, vec![3]);
    assert_eq!(placement.cleared.cells.len(), 10);
    assert_eq!(placement.cleared.cells, (30..40).collect::<Vec<_>>());
    assert_eq!(state.score(), 5 + 5 + 20);

    for x in 0..10 {
        assert!(!state.board().is_occupied(x, 3).unwrap());
    }
    assert_eq!(second.events(), vec![GameEvent::Drop, GameEvent::Solved]);
}

#[test]
fn test_placement_touches_only_shape_cells() {
    let mut board = Board::new(10);
    board.set_occupied(0, 0, true).unwrap();
    board.set_occupied(9, 9, true).unwrap();

    for index in 0..catalog_size() {
        let shape = shape_for(index).unwrap();
        for (x, y) in legal_anchors(shape, &board).collect::<Vec<_>>() {
            let mut after = board.clone();
            let placed = apply_placement(shape, x, y, &mut after).unwrap();
            assert_eq!(placed.len(), shape.len());

            for (i, (&was, &now)) in board.cells().iter().zip(after.cells()).enumerate() {
                if placed.contains(&i) {
                    assert!(!was && now, "cell {} should go from free to taken", i);
                } else {
                    assert_eq!(was, now, "cell {} should be untouched", i);
                }
            }
        }
    }
}

#[test]
fn test_full_game_invariants() {
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = GameState::new(&GameConfig::default(), &mut rng);
        let mut moves = 0;

        while let Some((slot, x, y)) = first_legal_move(&state) {
            let before = state.clone();
            let outcome = state.place_piece(slot, x, y, &mut rng).unwrap();
            let placement = outcome.placement().expect("legal move must be placed");

            // Score never decreases, and grows by exactly the reported points
            assert!(state.score() >= before.score());
            assert_eq!(state.score(), before.score() + placement.points);

            // Refill happens exactly when the last offered piece was used
            let last_piece = before.available_count() == 1;
            assert_eq!(placement.refilled, last_piece);
            if !last_piece {
                for (i, (&prior, &now)) in before.slots().iter().zip(state.slots()).enumerate() {
                    if i == slot {
                        assert_eq!(now, None);
                    } else {
                        assert_eq!(now, prior);
                    }
                }
            }

            assert_eq!(placement.stuck, !state.can_make_move());
            moves += 1;
            if moves > 1000 {
                break;
            }
        }

        assert!(moves > 0);
        if moves <= 1000 {
            assert!(!state.can_make_move());
            assert!(!any_move_exists(&state));
        }
    }
}

#[test]
fn test_session_round_trip_through_files() {
    let dir = std::env::temp_dir().join(format!("blockpuzzle-it-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let mut session = GameSession::with_seed(GameConfig::default(), FileStorage::new(&dir), 99);
    for _ in 0..6 {
        if let Some((slot, x, y)) = first_legal_move(session.state()) {
            session.place_piece(slot, x, y).unwrap();
        }
    }
    let snapshot = session.state().clone();
    drop(session);

    let restored = GameSession::with_seed(GameConfig::default(), FileStorage::new(&dir), 1);
    assert_eq!(restored.state(), &snapshot);
    assert_eq!(restored.board(), snapshot.board());
    assert_eq!(restored.slots(), snapshot.slots());
    assert_eq!(restored.score(), snapshot.score());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_saved_record_matches_documented_format() {
    let mut storage = MemoryStorage::new();
    let record = r#"{"gridSize":3,"occupiedCells":[true,true,false,false,false,false,false,false,false],"availablePieces":[18,-1,-1],"score":40}"#;
    storage.save(GAME_STATE_KEY, record).unwrap();

    let mut session = GameSession::with_seed(GameConfig::default(), storage, 0);
    assert_eq!(session.board().size(), 3);
    assert_eq!(session.score(), 40);
    assert_eq!(session.slots(), &[Some(18), None, None]);

    // Completing row 0 with the last piece refills and scores 5 + 20
    let outcome = session.place_piece(0, 2, 0).unwrap();
    let placement = outcome.placement().unwrap();
    assert!(placement.refilled);
    assert_eq!(placement.cleared.cells, vec![0, 1, 2]);
    assert_eq!(session.score(), 65);
    assert_eq!(session.available_count(), 3);
}

#[test]
fn test_high_score_tracks_best_session() {
    let mut storage = MemoryStorage::new();
    let mut best = HighScore::load(&storage);

    assert!(best.update(65));
    best.save(&mut storage).unwrap();
    assert!(!HighScore::load(&storage).update(40));
    assert_eq!(HighScore::load(&storage).local_best, 65);
}
