//! Integration tests for weiqi-rust
//!
//! Rules, scoring, symmetry and game-record scenarios on small boards.

use weiqi_rust::board::{Action, Color, neighbors, parse_vertex, vertex_string};
use weiqi_rust::error::{Error, MoveError};
use weiqi_rust::features::state_planes;
use weiqi_rust::game::Game;
use weiqi_rust::playout::random_action;
use weiqi_rust::position::{Position, apply};
use weiqi_rust::scoring::{areas, winner, winning};
use weiqi_rust::symmetry::{Symmetry, all_symmetries};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Play a sequence of point indices, alternating colors from black.
fn play_points(size: usize, moves: &[Action]) -> Position {
    let mut pos = Position::new(size).unwrap();
    for &mv in moves {
        pos = apply(&pos, mv).unwrap();
    }
    pos
}

/// Play a sequence of GTP vertices ("pass" allowed).
fn play_vertices(size: usize, moves: &[&str]) -> Position {
    let mut pos = Position::new(size).unwrap();
    for mv in moves {
        let action = parse_vertex(mv, size).unwrap();
        pos = apply(&pos, action).unwrap();
    }
    pos
}

fn distinct<T: PartialEq>(items: Vec<T>) -> usize {
    let mut seen: Vec<T> = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen.len()
}

// =============================================================================
// Coordinate tests
// =============================================================================

#[test]
fn test_vertex_corners() {
    assert_eq!(parse_vertex("A1", 9), Some(72));
    assert_eq!(parse_vertex("J9", 9), Some(8));
    assert_eq!(parse_vertex("a9", 9), Some(0));
    assert_eq!(parse_vertex("pass", 9), Some(81));
    assert_eq!(parse_vertex("I5", 9), None, "column I is skipped");
    assert_eq!(parse_vertex("A10", 9), None);
}

#[test]
fn test_vertex_roundtrip_all_sizes() {
    for size in [5, 9, 13, 19] {
        for action in 0..=size * size {
            let vertex = vertex_string(action, size);
            assert_eq!(parse_vertex(&vertex, size), Some(action), "{vertex}");
        }
    }
}

// =============================================================================
// Move execution tests
// =============================================================================

#[test]
fn test_capture_single_stone() {
    // Black in the center, white surrounds it while black plays elsewhere.
    let pos = play_points(5, &[12, 7, 0, 11, 24, 13, 4]);
    assert_eq!(pos.color_at(12), Some(Color::Black));
    let pos = apply(&pos, 17).unwrap();
    assert_eq!(pos.color_at(12), None, "surrounded stone is removed");
    assert_eq!(pos.stone_count(Color::Black), 3);
    assert_eq!(pos.stone_count(Color::White), 4);
}

#[test]
fn test_capture_group() {
    // Two black stones on the edge, captured together.
    let pos = play_vertices(5, &["A1", "A3", "B1", "B2", "E5", "C1"]);
    assert_eq!(pos.color_at(20), Some(Color::Black));
    let pos = apply(&pos, parse_vertex("pass", 5).unwrap()).unwrap();
    let pos = apply(&pos, parse_vertex("A2", 5).unwrap()).unwrap();
    assert_eq!(pos.color_at(20), None);
    assert_eq!(pos.color_at(21), None);
    assert_eq!(pos.stone_count(Color::Black), 1);
}

#[test]
fn test_ko_enforcement() {
    // White captures the stone at 12 by playing into black's eye at 11.
    let pos = play_points(5, &[6, 7, 10, 17, 16, 13, 12, 11]);
    assert_eq!(pos.color_at(12), None);
    assert_eq!(pos.ko_point(), Some(12));
    assert!(pos.invalid()[12]);
    assert_eq!(
        apply(&pos, 12),
        Err(Error::IllegalMove {
            action: 12,
            reason: MoveError::Ko
        })
    );

    // After an exchange elsewhere black may retake, starting a new ko.
    let pos = apply(&pos, 24).unwrap();
    assert_eq!(pos.ko_point(), None);
    let pos = apply(&pos, 4).unwrap();
    assert!(!pos.invalid()[12]);
    let pos = apply(&pos, 12).unwrap();
    assert_eq!(pos.color_at(11), None);
    assert_eq!(pos.ko_point(), Some(11));
}

#[test]
fn test_no_ko_when_capturing_stone_touches_friend() {
    // The capturing stone at 11 is connected to white 10.
    let pos = Position::setup(5, &[12], &[7, 13, 17, 10], Color::White).unwrap();
    let pos = apply(&pos, 11).unwrap();
    assert_eq!(pos.color_at(12), None);
    assert_eq!(pos.ko_point(), None);
}

#[test]
fn test_no_ko_for_multi_stone_capture() {
    // Black pair 12-13 in atari, white takes both from inside black's shape.
    let black = [6, 10, 16, 12, 13];
    let white = [7, 8, 14, 17, 18];
    let pos = Position::setup(5, &black, &white, Color::White).unwrap();
    let pos = apply(&pos, 11).unwrap();
    assert_eq!(pos.color_at(12), None);
    assert_eq!(pos.color_at(13), None);
    assert_eq!(pos.ko_point(), None);
}

#[test]
fn test_suicide_prohibited() {
    let pos = play_vertices(5, &["B5", "E1", "A4"]);
    let corner = parse_vertex("A5", 5).unwrap();
    assert!(pos.invalid()[corner]);
    assert!(!pos.valid_moves()[corner]);
    assert_eq!(
        apply(&pos, corner),
        Err(Error::IllegalMove {
            action: corner,
            reason: MoveError::Suicide
        })
    );
}

#[test]
fn test_two_pass_termination() {
    let pos = Position::new(5).unwrap();
    let pass = pos.pass_action();
    let once = apply(&pos, pass).unwrap();
    assert!(once.previous_pass());
    assert!(!once.is_terminal());

    let twice = apply(&once, pass).unwrap();
    assert!(twice.is_terminal());
    assert!(matches!(apply(&twice, 0), Err(Error::IllegalCall(_))));
    assert!(matches!(apply(&twice, pass), Err(Error::IllegalCall(_))));
}

#[test]
fn test_occupancy_invariant_random_game() {
    let mut rng = fastrand::Rng::with_seed(2024);
    let mut pos = Position::new(7).unwrap();
    for _ in 0..300 {
        if pos.is_terminal() {
            break;
        }
        let action = random_action(&pos, &mut rng);
        pos = apply(&pos, action).unwrap();
        assert!(pos.black().iter().zip(pos.white()).all(|(&b, &w)| !(b && w)));
        for pt in 0..49 {
            if pos.color_at(pt).is_some() {
                assert!(pos.invalid()[pt]);
            }
        }
    }
}

#[test]
fn test_ko_point_matches_capture_shape_random_games() {
    let size = 5;
    let mut kos_seen = 0;
    for seed in 0..20 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut pos = Position::new(size).unwrap();
        for _ in 0..400 {
            let moves: Vec<Action> = pos
                .legal_actions()
                .into_iter()
                .filter(|&a| a != pos.pass_action())
                .collect();
            if moves.is_empty() {
                break;
            }
            let action = moves[rng.usize(..moves.len())];
            let mover = pos.turn();
            let surrounded = neighbors(action, size)
                .all(|n| pos.color_at(n) == Some(mover.opponent()));

            let next = apply(&pos, action).unwrap();
            let captured: Vec<Action> = (0..size * size)
                .filter(|&pt| {
                    pos.color_at(pt) == Some(mover.opponent()) && next.color_at(pt).is_none()
                })
                .collect();

            let expected = match captured[..] {
                [single] if surrounded => Some(single),
                _ => None,
            };
            assert_eq!(next.ko_point(), expected, "seed {seed}, move {action}");
            if let Some(old) = pos.ko_point() {
                assert_ne!(next.ko_point(), Some(old), "ko cleared after one ply");
            }
            if expected.is_some() {
                kos_seen += 1;
            }
            pos = next;
        }
    }
    assert!(kos_seen > 0);
}

// =============================================================================
// Scoring tests
// =============================================================================

#[test]
fn test_score_filled_checkerboard() {
    let size = 5;
    let (black, white): (Vec<usize>, Vec<usize>) =
        (0..size * size).partition(|&pt| (pt / size + pt % size) % 2 == 0);
    let pos = Position::setup(size, &black, &white, Color::Black).unwrap();
    assert_eq!(areas(&pos), (13, 12));
    assert_eq!(winning(&pos, 0.5), 1);
    assert_eq!(winning(&pos, 1.0), 0);
    assert_eq!(winning(&pos, 7.5), -1);
    assert_eq!(winner(&pos, 1.0), None);
}

#[test]
fn test_score_territory_and_neutral_points() {
    // Black wall on column B, white wall on column D; column C is dame.
    let size = 5;
    let black: Vec<usize> = (0..size).map(|r| r * size + 1).collect();
    let white: Vec<usize> = (0..size).map(|r| r * size + 3).collect();
    let pos = Position::setup(size, &black, &white, Color::Black).unwrap();
    assert_eq!(areas(&pos), (10, 10));
    assert_eq!(winner(&pos, 0.5), Some(Color::White));
}

#[test]
fn test_score_empty_board() {
    let pos = Position::new(9).unwrap();
    assert_eq!(areas(&pos), (0, 0));
    assert_eq!(winning(&pos, 7.5), -1);
}

// =============================================================================
// Symmetry tests
// =============================================================================

#[test]
fn test_symmetry_roundtrip_on_state() {
    let pos = play_points(5, &[0, 1, 7, 13, 24]);
    let planes = state_planes(&pos);
    for (s, transformed) in Symmetry::ALL.iter().zip(all_symmetries(&planes, 5)) {
        assert_eq!(s.inverse().apply(&transformed, 5), planes);
    }
}

#[test]
fn test_symmetry_orbits() {
    let empty = state_planes(&Position::new(5).unwrap());
    assert_eq!(distinct(all_symmetries(&empty, 5)), 1);

    let center = state_planes(&play_points(5, &[12]));
    assert_eq!(distinct(all_symmetries(&center, 5)), 1);

    let corner = state_planes(&play_points(5, &[0]));
    assert_eq!(distinct(all_symmetries(&corner, 5)), 4);

    let generic = state_planes(&play_points(5, &[1]));
    assert_eq!(distinct(all_symmetries(&generic, 5)), 8);
}

#[test]
fn test_symmetry_group_closed() {
    let tensor: Vec<u32> = (0..16).collect();
    let orbit = all_symmetries(&tensor, 4);
    for s in Symmetry::ALL {
        for image in &orbit {
            assert!(orbit.contains(&s.apply(image, 4)));
        }
    }
}

// =============================================================================
// Game record tests
// =============================================================================

#[test]
fn test_game_undo_and_replay() {
    let mut game = Game::new(5, 0.5).unwrap();
    for vertex in ["C3", "C4", "D3", "pass"] {
        game.play_vertex(vertex).unwrap();
    }
    let snapshot = game.position().clone();
    game.play_vertex("B2").unwrap();

    game.undo(1).unwrap();
    assert_eq!(game.position(), &snapshot);

    let replayed = Game::replay(5, 0.5, &game.moves()).unwrap();
    assert_eq!(replayed.position(), game.position());
    assert_eq!(replayed.vertices(), vec!["C3", "C4", "D3", "pass"]);
}

#[test]
fn test_game_result() {
    let mut game = Game::replay(5, 7.5, &[12, 25, 13, 25, 25]).unwrap();
    assert!(game.is_over());
    assert_eq!(game.areas(), (25, 0));
    assert_eq!(game.winner(), Some(Color::Black));
    assert!(matches!(game.play(0), Err(Error::IllegalCall(_))));
    game.undo(1).unwrap();
    assert!(!game.is_over());
    assert_eq!(game.outcome(), None);
}
