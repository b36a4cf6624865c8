#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state and turn resolution for Match Three.
//!
//! The world owns the only mutable [`Grid`]. Every command is resolved to a
//! settled board inside a single [`apply`] call, and the outcome is appended to
//! the caller's event buffer as an ordered script that presentation layers
//! replay at their own pace.

pub mod grid;
pub mod moves;

use std::collections::BTreeSet;

use match_three_core::{
    Command, Event, GridDimensions, Position, SwapRejection, TurnPhase, MAX_SETTLE_PASSES,
    MIN_TILE_KINDS, POINTS_PER_TILE, TILE_KIND_COUNT,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use grid::{Grid, GridError, InitializationAnomaly, SettleReport};

const DEFAULT_RNG_SEED: u64 = 0x5eed_c0ff_ee15_b00c;

/// Number of fresh deals attempted before accepting a board without legal moves.
const DEAL_ATTEMPTS: u32 = 100;

/// Tuning knobs for a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    dimensions: GridDimensions,
    tile_kinds: u8,
    points_per_tile: u32,
    max_settle_passes: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with explicit values.
    ///
    /// `tile_kinds` is raised to at least [`MIN_TILE_KINDS`].
    #[must_use]
    pub const fn new(
        dimensions: GridDimensions,
        tile_kinds: u8,
        points_per_tile: u32,
        max_settle_passes: u32,
        rng_seed: u64,
    ) -> Self {
        let tile_kinds = if tile_kinds < MIN_TILE_KINDS {
            MIN_TILE_KINDS
        } else {
            tile_kinds
        };
        Self {
            dimensions,
            tile_kinds,
            points_per_tile,
            max_settle_passes,
            rng_seed,
        }
    }

    /// Returns a copy that seeds the random source with `rng_seed`.
    #[must_use]
    pub const fn with_seed(self, rng_seed: u64) -> Self {
        Self { rng_seed, ..self }
    }

    /// Shape of the board.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Number of distinct tile kinds dealt.
    #[must_use]
    pub const fn tile_kinds(&self) -> u8 {
        self.tile_kinds
    }

    /// Points awarded per cleared tile.
    #[must_use]
    pub const fn points_per_tile(&self) -> u32 {
        self.points_per_tile
    }

    /// Correction passes allowed when dealing a match-free board.
    #[must_use]
    pub const fn max_settle_passes(&self) -> u32 {
        self.max_settle_passes
    }

    /// Seed of the random source.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            GridDimensions::default(),
            TILE_KIND_COUNT,
            POINTS_PER_TILE,
            MAX_SETTLE_PASSES,
            DEFAULT_RNG_SEED,
        )
    }
}

/// Represents the authoritative Match Three world state.
#[derive(Debug)]
pub struct World {
    config: Config,
    grid: Grid,
    rng: ChaCha8Rng,
    phase: TurnPhase,
    score: u32,
    turns_played: u64,
    anomaly: Option<InitializationAnomaly>,
}

impl World {
    /// Deals a fresh game and announces it with [`Event::GameInitialized`].
    ///
    /// A dealt board without any legal swap is followed at once by
    /// [`Event::GameOver`].
    #[must_use]
    pub fn new(config: Config, out_events: &mut Vec<Event>) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let (grid, anomaly) = deal(&config, &mut rng);
        out_events.push(Event::GameInitialized {
            snapshot: grid.snapshot(),
        });

        let mut world = Self {
            config,
            grid,
            rng,
            phase: TurnPhase::Idle,
            score: 0,
            turns_played: 0,
            anomaly,
        };
        world.finish_turn(out_events);
        world
    }

    /// Wraps a hand-built board, waiting for the first move. No event is emitted.
    ///
    /// The board's shape and kind count replace those in `config`.
    #[must_use]
    pub fn from_grid(config: Config, grid: Grid) -> Self {
        let config = Config {
            dimensions: grid.dimensions(),
            tile_kinds: grid.kinds(),
            ..config
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            grid,
            phase: TurnPhase::Idle,
            score: 0,
            turns_played: 0,
            anomaly: None,
        }
    }

    fn validate_swap(&self, first: Position, second: Position) -> Result<(), SwapRejection> {
        let dimensions = self.grid.dimensions();
        if self.phase != TurnPhase::Idle {
            return Err(SwapRejection::NotIdle);
        }
        if !dimensions.contains(first) || !dimensions.contains(second) {
            return Err(SwapRejection::OutOfBounds);
        }
        if first == second {
            return Err(SwapRejection::SamePosition);
        }
        if !first.is_adjacent(second) {
            return Err(SwapRejection::NotAdjacent);
        }
        Ok(())
    }

    fn resolve_swap(&mut self, first: Position, second: Position, out_events: &mut Vec<Event>) {
        self.phase = TurnPhase::Swapping;
        self.grid.swap(first, second);

        let matches = self.grid.find_matches();
        if matches.is_empty() {
            self.grid.swap(first, second);
            self.phase = TurnPhase::Idle;
            out_events.push(Event::SwapRejectedNoMatch { first, second });
            return;
        }

        let (Some(first_kind), Some(second_kind)) =
            (self.grid.kind_at(first), self.grid.kind_at(second))
        else {
            self.grid.swap(first, second);
            self.phase = TurnPhase::Idle;
            return;
        };

        out_events.push(Event::SwapAccepted {
            first,
            second,
            first_kind,
            second_kind,
        });
        self.phase = TurnPhase::Cascading;
        self.cascade(matches, out_events);
        self.turns_played = self.turns_played.saturating_add(1);
        self.finish_turn(out_events);
    }

    fn cascade(&mut self, initial: BTreeSet<Position>, out_events: &mut Vec<Event>) {
        let mut matches = initial;
        while !matches.is_empty() {
            let positions: Vec<Position> = matches.into_iter().collect();
            let cleared = u32::try_from(positions.len()).unwrap_or(u32::MAX);
            self.score = self
                .score
                .saturating_add(cleared.saturating_mul(self.config.points_per_tile));

            self.grid.clear(positions.iter().copied());
            out_events.push(Event::MatchesCleared {
                positions,
                cleared,
                score: self.score,
            });

            let falls = self.grid.compact_columns();
            out_events.push(Event::TilesFell { falls });

            let spawns = self.grid.refill_empties(&mut self.rng);
            out_events.push(Event::TilesSpawned { spawns });

            matches = self.grid.find_matches();
        }
    }

    fn finish_turn(&mut self, out_events: &mut Vec<Event>) {
        if moves::has_any_legal_move(&self.grid) {
            self.phase = TurnPhase::Idle;
        } else {
            self.phase = TurnPhase::GameOver;
            out_events.push(Event::GameOver { score: self.score });
        }
    }

    fn restart(&mut self, out_events: &mut Vec<Event>) {
        let (grid, anomaly) = deal(&self.config, &mut self.rng);
        self.grid = grid;
        self.anomaly = anomaly;
        self.score = 0;
        self.turns_played = 0;
        out_events.push(Event::GameRestarted {
            snapshot: self.grid.snapshot(),
        });
        self.finish_turn(out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Swap requests that are off the board, not adjacent, or arrive while the
/// world is not idle are ignored without emitting any event.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RequestSwap { first, second } => {
            if world.validate_swap(first, second).is_ok() {
                world.resolve_swap(first, second, out_events);
            }
        }
        Command::Restart => world.restart(out_events),
    }
}

/// Deals random boards until one offers a legal move or the attempts run out.
fn deal<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> (Grid, Option<InitializationAnomaly>) {
    let mut grid = Grid::new(config.dimensions, config.tile_kinds);
    let mut anomaly = None;
    for _ in 0..DEAL_ATTEMPTS {
        grid.randomize(rng);
        anomaly = grid
            .eliminate_initial_matches(rng, config.max_settle_passes)
            .err();
        if moves::has_any_legal_move(&grid) {
            break;
        }
    }
    (grid, anomaly)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use match_three_core::{
        GameStatus, GridDimensions, GridSnapshot, Position, SwapRejection, TurnPhase,
    };

    use super::{Config, Grid, InitializationAnomaly, World};

    /// Current phase of the turn state machine.
    #[must_use]
    pub fn phase(world: &World) -> TurnPhase {
        world.phase
    }

    /// Coarse status derived from the current phase.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.phase.status()
    }

    /// Score accumulated in the current game.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Number of accepted swaps in the current game.
    #[must_use]
    pub fn turns_played(world: &World) -> u64 {
        world.turns_played
    }

    /// Provides read-only access to the board.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Captures an immutable copy of the board.
    #[must_use]
    pub fn snapshot(world: &World) -> GridSnapshot {
        world.grid.snapshot()
    }

    /// Shape of the board.
    #[must_use]
    pub fn dimensions(world: &World) -> GridDimensions {
        world.grid.dimensions()
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Anomaly recorded while dealing the current board, if any.
    #[must_use]
    pub fn initialization_anomaly(world: &World) -> Option<InitializationAnomaly> {
        world.anomaly
    }

    /// Explains why a swap request would be ignored, without applying it.
    pub fn validate_swap(
        world: &World,
        first: Position,
        second: Position,
    ) -> Result<(), SwapRejection> {
        world.validate_swap(first, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_three_core::GameStatus;

    const DEADLOCKED: [[u8; 5]; 5] = [
        [4, 3, 1, 2, 5],
        [4, 5, 4, 2, 3],
        [1, 2, 3, 5, 4],
        [5, 4, 1, 3, 4],
        [3, 4, 5, 2, 1],
    ];

    #[test]
    fn new_world_announces_settled_board() {
        let mut events = Vec::new();
        let world = World::new(Config::default(), &mut events);

        assert_eq!(
            events,
            vec![Event::GameInitialized {
                snapshot: query::snapshot(&world),
            }]
        );
        assert_eq!(query::phase(&world), TurnPhase::Idle);
        assert_eq!(query::score(&world), 0);
        assert!(query::grid(&world).find_matches().is_empty());
        assert_eq!(query::grid(&world).empty_count(), 0);
        assert!(moves::has_any_legal_move(query::grid(&world)));
    }

    #[test]
    fn same_seed_deals_same_board() {
        let config = Config::default().with_seed(99);
        let first = World::new(config, &mut Vec::new());
        let second = World::new(config, &mut Vec::new());
        assert_eq!(query::grid(&first), query::grid(&second));
    }

    #[test]
    fn deadlocked_board_ends_the_game() {
        let grid = Grid::from_rows(&DEADLOCKED, 5).expect("valid layout");
        let mut world = World::from_grid(Config::default(), grid);
        world.score = 120;
        let mut events = Vec::new();

        world.finish_turn(&mut events);

        assert_eq!(events, vec![Event::GameOver { score: 120 }]);
        assert_eq!(query::status(&world), GameStatus::Over);
        assert_eq!(
            query::validate_swap(&world, Position::new(0, 0), Position::new(0, 1)),
            Err(SwapRejection::NotIdle)
        );
    }

    #[test]
    fn game_over_ignores_swaps_until_restart() {
        let grid = Grid::from_rows(&DEADLOCKED, 5).expect("valid layout");
        let mut world = World::from_grid(Config::default(), grid);
        world.finish_turn(&mut Vec::new());

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestSwap {
                first: Position::new(0, 0),
                second: Position::new(0, 1),
            },
            &mut events,
        );
        assert!(events.is_empty());

        apply(&mut world, Command::Restart, &mut events);
        assert!(matches!(events.as_slice(), [Event::GameRestarted { .. }]));
        assert_eq!(query::phase(&world), TurnPhase::Idle);
        assert_eq!(query::score(&world), 0);
    }

    #[test]
    fn deadlocked_deal_ends_the_game_at_once() {
        let config = Config::new(GridDimensions::new(2, 2), 5, POINTS_PER_TILE, 100, 8);
        let mut events = Vec::new();
        let mut world = World::new(config, &mut events);

        assert!(matches!(
            events.as_slice(),
            [Event::GameInitialized { .. }, Event::GameOver { score: 0 }]
        ));
        assert_eq!(query::phase(&world), TurnPhase::GameOver);

        events.clear();
        apply(&mut world, Command::Restart, &mut events);
        assert!(matches!(
            events.as_slice(),
            [Event::GameRestarted { .. }, Event::GameOver { score: 0 }]
        ));
        assert_eq!(query::status(&world), GameStatus::Over);
    }

    #[test]
    fn config_raises_tile_kinds_to_the_minimum() {
        let config = Config::new(GridDimensions::new(3, 3), 1, POINTS_PER_TILE, 100, 1);
        assert_eq!(config.tile_kinds(), MIN_TILE_KINDS);
        assert_eq!(Config::default().tile_kinds(), TILE_KIND_COUNT);
    }

    #[test]
    fn from_grid_adopts_board_shape() {
        let grid = Grid::from_rows(&[[1, 2, 1], [2, 1, 2], [1, 2, 3]], 3).expect("valid layout");
        let world = World::from_grid(Config::default(), grid);
        assert_eq!(query::dimensions(&world), GridDimensions::new(3, 3));
        assert_eq!(query::config(&world).tile_kinds(), 3);
        assert_eq!(query::config(&world).points_per_tile(), POINTS_PER_TILE);
    }

    #[test]
    fn validation_reports_each_rejection() {
        let grid = Grid::from_rows(&DEADLOCKED, 5).expect("valid layout");
        let world = World::from_grid(Config::default(), grid);
        let at = Position::new;

        assert_eq!(query::validate_swap(&world, at(0, 0), at(0, 1)), Ok(()));
        assert_eq!(
            query::validate_swap(&world, at(0, 4), at(0, 5)),
            Err(SwapRejection::OutOfBounds)
        );
        assert_eq!(
            query::validate_swap(&world, at(2, 2), at(2, 2)),
            Err(SwapRejection::SamePosition)
        );
        assert_eq!(
            query::validate_swap(&world, at(0, 0), at(1, 1)),
            Err(SwapRejection::NotAdjacent)
        );
    }
}
