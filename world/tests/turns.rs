use match_three_core::{Command, Event, Position, TileKind, TurnPhase, POINTS_PER_TILE};
use match_three_world::{self as world, query, Config, Grid, World};

/// Match-free board whose only legal swap is (0, 2) with (1, 2).
const FIXTURE: [[u8; 5]; 5] = [
    [1, 1, 2, 3, 4],
    [3, 4, 1, 5, 2],
    [4, 5, 3, 2, 1],
    [2, 3, 4, 1, 5],
    [5, 2, 5, 4, 3],
];

fn at(row: u32, column: u32) -> Position {
    Position::new(row, column)
}

fn kind(value: u8) -> TileKind {
    TileKind::new(value).expect("non-zero kind")
}

fn fixture_world() -> World {
    let grid = Grid::from_rows(&FIXTURE, 5).expect("valid layout");
    assert!(grid.find_matches().is_empty());
    World::from_grid(Config::default().with_seed(0x0123_4567), grid)
}

fn swap(world: &mut World, first: Position, second: Position) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::RequestSwap { first, second }, &mut events);
    events
}

#[test]
fn matching_swap_clears_the_run_and_scores_it() {
    let mut world = fixture_world();

    let events = swap(&mut world, at(0, 2), at(1, 2));

    assert_eq!(
        events[0],
        Event::SwapAccepted {
            first: at(0, 2),
            second: at(1, 2),
            first_kind: kind(1),
            second_kind: kind(2),
        }
    );
    assert_eq!(
        events[1],
        Event::MatchesCleared {
            positions: vec![at(0, 0), at(0, 1), at(0, 2)],
            cleared: 3,
            score: 3 * POINTS_PER_TILE,
        }
    );
    assert_eq!(events[2], Event::TilesFell { falls: Vec::new() });
    match &events[3] {
        Event::TilesSpawned { spawns } => {
            let positions: Vec<Position> = spawns.iter().map(|spawn| spawn.position).collect();
            assert_eq!(positions, vec![at(0, 0), at(0, 1), at(0, 2)]);
        }
        other => panic!("expected spawned tiles, got {other:?}"),
    }

    assert!(query::score(&world) >= 30);
    assert_eq!(query::turns_played(&world), 1);
    assert!(query::grid(&world).find_matches().is_empty());
    assert_eq!(query::grid(&world).empty_count(), 0);
    assert_ne!(query::phase(&world), TurnPhase::Cascading);
}

#[test]
fn chained_rounds_follow_clear_fall_spawn_order() {
    let mut world = fixture_world();
    let events = swap(&mut world, at(0, 2), at(1, 2));

    let rounds = &events[1..];
    let (rounds, tail) = match rounds.last() {
        Some(Event::GameOver { .. }) => rounds.split_at(rounds.len() - 1),
        _ => (rounds, &[][..]),
    };
    assert_eq!(rounds.len() % 3, 0, "each round emits exactly three events");
    for round in rounds.chunks(3) {
        assert!(matches!(round[0], Event::MatchesCleared { .. }));
        assert!(matches!(round[1], Event::TilesFell { .. }));
        assert!(matches!(round[2], Event::TilesSpawned { .. }));
    }

    let game_over = !tail.is_empty();
    assert_eq!(query::phase(&world) == TurnPhase::GameOver, game_over);
}

#[test]
fn swapping_equal_tiles_is_rejected() {
    let mut world = fixture_world();
    let before = query::grid(&world).clone();

    let events = swap(&mut world, at(0, 0), at(0, 1));

    assert_eq!(
        events,
        vec![Event::SwapRejectedNoMatch {
            first: at(0, 0),
            second: at(0, 1),
        }]
    );
    assert_eq!(query::grid(&world), &before);
    assert_eq!(query::phase(&world), TurnPhase::Idle);
    assert_eq!(query::turns_played(&world), 0);
}

#[test]
fn swap_without_match_is_reverted() {
    let mut world = fixture_world();
    let before = query::grid(&world).clone();

    let events = swap(&mut world, at(4, 1), at(4, 0));

    assert_eq!(
        events,
        vec![Event::SwapRejectedNoMatch {
            first: at(4, 1),
            second: at(4, 0),
        }]
    );
    assert_eq!(query::grid(&world), &before);
    assert_eq!(query::score(&world), 0);
    assert!(query::grid(&world).find_matches().is_empty());
}

#[test]
fn non_adjacent_requests_are_silently_ignored() {
    let mut world = fixture_world();
    let before = query::grid(&world).clone();
    let dimensions = query::dimensions(&world);

    for first in dimensions.positions() {
        for second in dimensions.positions() {
            if first.manhattan_distance(second) == 1 {
                continue;
            }
            assert!(swap(&mut world, first, second).is_empty());
        }
    }

    assert_eq!(query::grid(&world), &before);
    assert_eq!(query::phase(&world), TurnPhase::Idle);
}

#[test]
fn off_board_requests_are_silently_ignored() {
    let mut world = fixture_world();
    let before = query::grid(&world).clone();

    assert!(swap(&mut world, at(0, 4), at(0, 5)).is_empty());
    assert!(swap(&mut world, at(5, 0), at(4, 0)).is_empty());
    assert!(swap(&mut world, at(u32::MAX, 0), at(u32::MAX - 1, 0)).is_empty());
    assert_eq!(query::grid(&world), &before);
}

#[test]
fn restart_resets_score_and_deals_a_new_board() {
    let mut world = fixture_world();
    let _ = swap(&mut world, at(0, 2), at(1, 2));
    assert!(query::score(&world) > 0);

    let mut events = Vec::new();
    world::apply(&mut world, Command::Restart, &mut events);

    assert_eq!(
        events,
        vec![Event::GameRestarted {
            snapshot: query::snapshot(&world),
        }]
    );
    assert_eq!(query::score(&world), 0);
    assert_eq!(query::turns_played(&world), 0);
    assert_eq!(query::phase(&world), TurnPhase::Idle);
    assert!(query::grid(&world).find_matches().is_empty());
    assert_eq!(query::grid(&world).empty_count(), 0);
}

#[test]
fn crossing_rows_clear_together_on_small_boards() {
    let grid = Grid::from_rows(&[[1, 2, 1], [2, 1, 2], [1, 2, 3]], 3).expect("valid layout");
    let mut world = World::from_grid(Config::default(), grid);

    let events = swap(&mut world, at(0, 1), at(1, 1));

    assert!(matches!(events[0], Event::SwapAccepted { .. }));
    match &events[1] {
        Event::MatchesCleared {
            positions, cleared, ..
        } => {
            assert_eq!(*cleared, 6);
            assert_eq!(
                positions,
                &vec![at(0, 0), at(0, 1), at(0, 2), at(1, 0), at(1, 1), at(1, 2)]
            );
        }
        other => panic!("expected cleared tiles, got {other:?}"),
    }
}
