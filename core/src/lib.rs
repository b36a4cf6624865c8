#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Match Three engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired moves, the world executes those commands via its
//! `apply` entry point, and then appends [`Event`] values describing the
//! complete outcome of the turn. Presentation layers replay that event script
//! at their own pace; the world never waits on them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rows on a standard board.
pub const GRID_ROWS: u32 = 5;

/// Number of columns on a standard board.
pub const GRID_COLUMNS: u32 = 5;

/// Number of distinct tile kinds dealt onto a standard board.
pub const TILE_KIND_COUNT: u8 = 5;

/// Fewest distinct tile kinds a board deals. Smaller kind counts are raised to this.
pub const MIN_TILE_KINDS: u8 = 3;

/// Points awarded for every tile cleared, regardless of run length or cascade depth.
pub const POINTS_PER_TILE: u32 = 10;

/// Upper bound on correction passes used when dealing a match-free board.
pub const MAX_SETTLE_PASSES: u32 = 100;

/// Commands that express every permissible world mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Requests that the tiles at two adjacent positions trade places.
    RequestSwap {
        /// Position the gesture started from.
        first: Position,
        /// Position the gesture ended on.
        second: Position,
    },
    /// Discards the current board and score and deals a fresh game.
    Restart,
}

/// Events appended by the world while processing commands.
///
/// Events of a single turn are always emitted in full before the next command
/// may be applied, so collaborators can treat every batch as an ordered script.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// A fresh, settled board is ready to display.
    GameInitialized {
        /// Copy of the dealt board.
        snapshot: GridSnapshot,
    },
    /// A swap took effect and produced at least one match; the cascade follows.
    SwapAccepted {
        /// First position named by the swap request.
        first: Position,
        /// Second position named by the swap request.
        second: Position,
        /// Kind that occupies `first` after the swap.
        first_kind: TileKind,
        /// Kind that occupies `second` after the swap.
        second_kind: TileKind,
    },
    /// A swap produced no match and was reverted; the board is unchanged.
    SwapRejectedNoMatch {
        /// First position named by the swap request.
        first: Position,
        /// Second position named by the swap request.
        second: Position,
    },
    /// A set of matched tiles disappeared and the score advanced.
    MatchesCleared {
        /// Deduplicated positions of the cleared tiles in row-major order.
        positions: Vec<Position>,
        /// Number of tiles cleared in this round.
        cleared: u32,
        /// Score after awarding this round.
        score: u32,
    },
    /// Surviving tiles dropped toward the bottom row.
    TilesFell {
        /// Every tile that changed row, column by column, bottom-most first.
        falls: Vec<TileFall>,
    },
    /// New tiles entered from above to fill every vacated cell.
    TilesSpawned {
        /// Every new tile in row-major order.
        spawns: Vec<TileSpawn>,
    },
    /// The settled board offers no legal swap; the game has ended.
    GameOver {
        /// Final score of the finished game.
        score: u32,
    },
    /// A new game replaced the previous board and score.
    GameRestarted {
        /// Copy of the freshly dealt board.
        snapshot: GridSnapshot,
    },
}

/// Location of a single board cell expressed as row and column indices.
///
/// Row 0 is the top of the board; gravity pulls tiles toward the last row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: u32,
    column: u32,
}

impl Position {
    /// Creates a new board position.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Reports whether the two positions share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Identifies the kind of a tile. Kinds are numbered from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKind(u8);

impl TileKind {
    /// Wraps the provided kind number, rejecting the reserved value zero.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Kind at the zero-based `index`, saturating at the largest representable kind.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        Self(index.saturating_add(1))
    }

    /// Retrieves the kind number, always at least 1.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Shape of a board measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    rows: u32,
    columns: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of cells on the board.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Reports whether the position lies on the board.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.column < self.columns
    }

    /// Row-major storage index of the position, if it lies on the board.
    #[must_use]
    pub fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let row = usize::try_from(position.row).ok()?;
        let column = usize::try_from(position.column).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    /// Iterates every position on the board in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| Position::new(row, column)))
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self::new(GRID_ROWS, GRID_COLUMNS)
    }
}

/// Immutable row-major copy of a board handed to presentation layers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSnapshot {
    dimensions: GridDimensions,
    cells: Vec<Option<TileKind>>,
}

impl GridSnapshot {
    /// Captures a snapshot from row-major cells; `None` marks an empty cell.
    ///
    /// Returns `None` when the cell count does not match the dimensions.
    #[must_use]
    pub fn new(dimensions: GridDimensions, cells: Vec<Option<TileKind>>) -> Option<Self> {
        if cells.len() != dimensions.cell_count() {
            return None;
        }
        Some(Self { dimensions, cells })
    }

    /// Captures a snapshot by querying every position in row-major order.
    #[must_use]
    pub fn from_fn<F>(dimensions: GridDimensions, kind_at: F) -> Self
    where
        F: FnMut(Position) -> Option<TileKind>,
    {
        let cells = dimensions.positions().map(kind_at).collect();
        Self { dimensions, cells }
    }

    /// Shape of the captured board.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Kind recorded at the position, or `None` for empty or off-board cells.
    #[must_use]
    pub fn kind_at(&self, position: Position) -> Option<TileKind> {
        self.dimensions
            .index(position)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Iterates the captured rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<TileKind>]> {
        let width = usize::try_from(self.dimensions.columns).unwrap_or(usize::MAX).max(1);
        self.cells.chunks(width)
    }
}

/// Describes a single tile dropping within its column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileFall {
    /// Cell the tile occupied before falling.
    pub from: Position,
    /// Cell the tile rests on after falling.
    pub to: Position,
    /// Kind of the falling tile.
    pub kind: TileKind,
}

/// Describes a single tile dealt into a vacated cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSpawn {
    /// Cell receiving the new tile.
    pub position: Position,
    /// Kind of the new tile.
    pub kind: TileKind,
}

/// Phases of the turn state machine driven by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for the next swap request.
    Idle,
    /// An accepted swap is being checked for matches.
    Swapping,
    /// Clear, gravity, and refill rounds are running.
    Cascading,
    /// No legal swap remains. Only a restart leaves this phase.
    GameOver,
}

impl TurnPhase {
    /// Collapses the phase into the coarse game status shown to players.
    #[must_use]
    pub const fn status(self) -> GameStatus {
        match self {
            Self::GameOver => GameStatus::Over,
            Self::Idle | Self::Swapping | Self::Cascading => GameStatus::Active,
        }
    }
}

/// Coarse status of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are still possible.
    Active,
    /// The board is deadlocked and the game has ended.
    Over,
}

/// Reasons a swap request is ignored before it touches the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SwapRejection {
    /// A turn is in progress or the game is over.
    #[error("the world is not waiting for a move")]
    NotIdle,
    /// At least one position lies off the board.
    #[error("swap position lies outside the board")]
    OutOfBounds,
    /// Both positions name the same cell.
    #[error("cannot swap a tile with itself")]
    SamePosition,
    /// The positions do not share an edge.
    #[error("swap positions are not adjacent")]
    NotAdjacent,
}
