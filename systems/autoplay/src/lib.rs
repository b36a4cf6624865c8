#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input stand-in that answers an idle board with a legal swap.

use match_three_core::{Command, Event, Position};
use match_three_world::{moves, Grid};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// How the next swap is picked among the legal ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Always plays the first legal swap in scan order.
    #[default]
    FirstFound,
    /// Plays a legal swap drawn from the seeded random source.
    Random,
}

/// Configuration parameters required to construct the autoplay system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Config {
    strategy: Strategy,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided strategy and seed.
    #[must_use]
    pub const fn new(strategy: Strategy, rng_seed: u64) -> Self {
        Self { strategy, rng_seed }
    }
}

/// Pure system that emits one swap request whenever the world settles.
#[derive(Debug)]
pub struct Autoplay {
    strategy: Strategy,
    rng: ChaCha8Rng,
}

impl Autoplay {
    /// Creates a new autoplay system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            strategy: config.strategy,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes the events of one command and the settled board to emit the next swap.
    ///
    /// Nothing is emitted for an empty batch or once the batch ends the game.
    pub fn handle(&mut self, events: &[Event], grid: &Grid, out: &mut Vec<Command>) {
        if matches!(events.last(), None | Some(Event::GameOver { .. })) {
            return;
        }

        if let Some((first, second)) = self.pick(grid) {
            out.push(Command::RequestSwap { first, second });
        }
    }

    fn pick(&mut self, grid: &Grid) -> Option<(Position, Position)> {
        match self.strategy {
            Strategy::FirstFound => moves::first_legal_swap(grid),
            Strategy::Random => moves::legal_swaps(grid).choose(&mut self.rng).copied(),
        }
    }
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Suggests a swap for the player without consuming any randomness.
#[must_use]
pub fn hint(grid: &Grid) -> Option<(Position, Position)> {
    moves::first_legal_swap(grid)
}
