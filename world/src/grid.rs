//! Board storage together with the pure match, gravity, and refill operations.
//!
//! Cells are stored row-major as raw kind numbers where zero marks an empty
//! cell. The sentinel never leaves this module: callers observe kinds through
//! [`Grid::kind_at`] and emptiness through [`Grid::is_empty`].

use std::collections::BTreeSet;

use match_three_core::{
    GridDimensions, GridSnapshot, Position, TileFall, TileKind, TileSpawn, MIN_TILE_KINDS,
};
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

const EMPTY: u8 = 0;
const MIN_RUN: usize = 3;

/// Rectangular board of tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    dimensions: GridDimensions,
    kinds: u8,
    cells: Vec<u8>,
}

impl Grid {
    /// Creates an empty board that deals kinds from `1..=kinds`.
    ///
    /// A board always deals at least [`MIN_TILE_KINDS`] kinds.
    #[must_use]
    pub fn new(dimensions: GridDimensions, kinds: u8) -> Self {
        Self {
            dimensions,
            kinds: kinds.max(MIN_TILE_KINDS),
            cells: vec![EMPTY; dimensions.cell_count()],
        }
    }

    /// Builds a board from explicit rows, top row first. Zero marks an empty cell.
    ///
    /// As with [`Grid::new`], `kinds` is raised to at least [`MIN_TILE_KINDS`].
    pub fn from_rows<const COLUMNS: usize>(
        rows: &[[u8; COLUMNS]],
        kinds: u8,
    ) -> Result<Self, GridError> {
        if rows.is_empty() || COLUMNS == 0 {
            return Err(GridError::EmptyLayout);
        }
        let row_count = u32::try_from(rows.len()).map_err(|_| GridError::TooLarge)?;
        let column_count = u32::try_from(COLUMNS).map_err(|_| GridError::TooLarge)?;
        let kinds = kinds.max(MIN_TILE_KINDS);

        let mut cells = Vec::with_capacity(rows.len() * COLUMNS);
        for (row, values) in (0..row_count).zip(rows) {
            for (column, &value) in (0..column_count).zip(values) {
                if value > kinds {
                    return Err(GridError::KindOutOfRange {
                        position: Position::new(row, column),
                        value,
                        kinds,
                    });
                }
                cells.push(value);
            }
        }

        Ok(Self {
            dimensions: GridDimensions::new(row_count, column_count),
            kinds,
            cells,
        })
    }

    /// Shape of the board.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Number of distinct kinds the board deals.
    #[must_use]
    pub const fn kinds(&self) -> u8 {
        self.kinds
    }

    /// Kind occupying the position, or `None` for empty or off-board cells.
    #[must_use]
    pub fn kind_at(&self, position: Position) -> Option<TileKind> {
        self.value(position).and_then(TileKind::new)
    }

    /// Reports whether the on-board position currently holds no tile.
    #[must_use]
    pub fn is_empty(&self, position: Position) -> bool {
        self.value(position) == Some(EMPTY)
    }

    /// Number of empty cells on the board.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&value| value == EMPTY).count()
    }

    /// Captures an immutable copy of the board.
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::from_fn(self.dimensions, |position| self.kind_at(position))
    }

    /// Fills every cell with a uniformly random kind. Matches are not prevented.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let kinds = self.kinds;
        for cell in &mut self.cells {
            *cell = random_kind(rng, kinds).get();
        }
    }

    /// Reports whether the tile at `position` belongs to a run of three or more
    /// along its row or its column. Empty cells never match.
    #[must_use]
    pub fn match_at(&self, position: Position) -> bool {
        match self.value(position) {
            Some(value) if value != EMPTY => self.forms_run(position, value),
            _ => false,
        }
    }

    /// Reports whether placing `kind` at `position` would complete a run there.
    ///
    /// The board is left untouched.
    #[must_use]
    pub fn would_match(&self, position: Position, kind: TileKind) -> bool {
        self.dimensions.contains(position) && self.forms_run(position, kind.get())
    }

    /// Rewrites matched cells until the board holds no run, or until
    /// `max_passes` full scans have been spent.
    ///
    /// Each matched cell is replaced by a random kind that differs from its
    /// current kind and does not complete a run in place. A cell with no such
    /// kind is left for the next pass.
    pub fn eliminate_initial_matches<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        max_passes: u32,
    ) -> Result<SettleReport, InitializationAnomaly> {
        let dimensions = self.dimensions;
        let mut candidates = Vec::with_capacity(usize::from(self.kinds));

        for pass in 1..=max_passes {
            let mut corrected = false;
            for position in dimensions.positions() {
                if !self.match_at(position) {
                    continue;
                }
                corrected = true;

                let current = self.value(position).unwrap_or(EMPTY);
                candidates.clear();
                candidates.extend(
                    (1..=self.kinds)
                        .filter(|&value| value != current && !self.forms_run(position, value)),
                );
                if let Some(&replacement) = candidates.choose(rng) {
                    self.set(position, replacement);
                }
            }

            if !corrected {
                return Ok(SettleReport { passes: pass });
            }
        }

        let residual = self.find_matches().len();
        if residual == 0 {
            Ok(SettleReport { passes: max_passes })
        } else {
            Err(InitializationAnomaly {
                passes: max_passes,
                residual,
            })
        }
    }

    /// Collects every position that belongs to a horizontal or vertical run of
    /// three or more equal tiles. Crossing runs share their common cell once.
    #[must_use]
    pub fn find_matches(&self) -> BTreeSet<Position> {
        let mut matches = BTreeSet::new();
        for line in self.lines() {
            for run in self.runs_in(&line) {
                for &position in run {
                    let _ = matches.insert(position);
                }
            }
        }
        matches
    }

    /// Reports whether any run of three or more exists on the board.
    #[must_use]
    pub fn has_match(&self) -> bool {
        self.lines().any(|line| !self.runs_in(&line).is_empty())
    }

    /// Exchanges the tiles at two on-board positions. Off-board positions are ignored.
    pub fn swap(&mut self, first: Position, second: Position) {
        if let (Some(first), Some(second)) = (
            self.dimensions.index(first),
            self.dimensions.index(second),
        ) {
            self.cells.swap(first, second);
        }
    }

    /// Empties every listed position.
    pub fn clear<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Position>,
    {
        for position in positions {
            self.set(position, EMPTY);
        }
    }

    /// Puts `kind` at an on-board position, replacing any tile already there.
    pub fn place(&mut self, position: Position, kind: TileKind) {
        self.set(position, kind.get());
    }

    /// Drops every tile as far down its column as it can go, keeping the
    /// vertical order of the survivors.
    ///
    /// Returns one record per tile that changed row, columns left to right and
    /// bottom-most tile first within a column.
    pub fn compact_columns(&mut self) -> Vec<TileFall> {
        let rows = self.dimensions.rows();
        let mut falls = Vec::new();

        for column in 0..self.dimensions.columns() {
            let mut landing = rows;
            for row in (0..rows).rev() {
                let from = Position::new(row, column);
                let Some(kind) = self.kind_at(from) else {
                    continue;
                };
                landing -= 1;
                if landing == row {
                    continue;
                }

                let to = Position::new(landing, column);
                self.set(to, kind.get());
                self.set(from, EMPTY);
                falls.push(TileFall { from, to, kind });
            }
        }

        falls
    }

    /// Deals a uniformly random kind into every empty cell.
    ///
    /// Returns the new tiles in row-major discovery order.
    pub fn refill_empties<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<TileSpawn> {
        let dimensions = self.dimensions;
        let kinds = self.kinds;
        let mut spawns = Vec::new();

        for position in dimensions.positions() {
            if !self.is_empty(position) {
                continue;
            }
            let kind = random_kind(rng, kinds);
            self.set(position, kind.get());
            spawns.push(TileSpawn { position, kind });
        }

        spawns
    }

    fn value(&self, position: Position) -> Option<u8> {
        self.dimensions
            .index(position)
            .and_then(|index| self.cells.get(index).copied())
    }

    fn set(&mut self, position: Position, value: u8) {
        if let Some(index) = self.dimensions.index(position) {
            if let Some(cell) = self.cells.get_mut(index) {
                *cell = value;
            }
        }
    }

    fn forms_run(&self, position: Position, value: u8) -> bool {
        let horizontal = 1 + self.count_towards(position, value, 0, -1)
            + self.count_towards(position, value, 0, 1);
        let vertical = 1 + self.count_towards(position, value, -1, 0)
            + self.count_towards(position, value, 1, 0);
        horizontal >= MIN_RUN || vertical >= MIN_RUN
    }

    fn count_towards(&self, origin: Position, value: u8, row_step: i64, column_step: i64) -> usize {
        let mut count = 0;
        let mut row = i64::from(origin.row()) + row_step;
        let mut column = i64::from(origin.column()) + column_step;
        while self.value_at(row, column) == Some(value) {
            count += 1;
            row += row_step;
            column += column_step;
        }
        count
    }

    fn value_at(&self, row: i64, column: i64) -> Option<u8> {
        let row = u32::try_from(row).ok()?;
        let column = u32::try_from(column).ok()?;
        self.value(Position::new(row, column))
    }

    /// Every row left to right, then every column top to bottom.
    fn lines(&self) -> impl Iterator<Item = Vec<Position>> {
        let rows = self.dimensions.rows();
        let columns = self.dimensions.columns();
        let horizontal = (0..rows).map(move |row| {
            (0..columns)
                .map(|column| Position::new(row, column))
                .collect::<Vec<Position>>()
        });
        let vertical = (0..columns).map(move |column| {
            (0..rows)
                .map(|row| Position::new(row, column))
                .collect::<Vec<Position>>()
        });
        horizontal.chain(vertical)
    }

    /// Maximal runs of at least three equal, non-empty cells along `line`.
    fn runs_in<'line>(&self, line: &'line [Position]) -> Vec<&'line [Position]> {
        let mut runs = Vec::new();
        let mut start = 0;
        while start < line.len() {
            let value = self.value(line[start]).unwrap_or(EMPTY);
            let mut end = start + 1;
            while end < line.len() && self.value(line[end]) == Some(value) {
                end += 1;
            }
            if value != EMPTY && end - start >= MIN_RUN {
                runs.push(&line[start..end]);
            }
            start = end;
        }
        runs
    }
}

fn random_kind<R: Rng + ?Sized>(rng: &mut R, kinds: u8) -> TileKind {
    TileKind::from_index(rng.gen_range(0..kinds.max(1)))
}

/// Outcome of a successful [`Grid::eliminate_initial_matches`] run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettleReport {
    /// Full-board scans spent, including the final clean scan.
    pub passes: u32,
}

/// Raised when the correction pass cap is reached while matches remain.
///
/// The board is still playable; the residual runs clear on the next cascade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("board still holds {residual} matched tiles after {passes} correction passes")]
pub struct InitializationAnomaly {
    /// Full-board scans spent before giving up.
    pub passes: u32,
    /// Number of tiles still belonging to a run.
    pub residual: usize,
}

/// Errors raised while building a board from explicit rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The layout contained no rows or no columns.
    #[error("board layout must contain at least one row and one column")]
    EmptyLayout,
    /// The layout does not fit the coordinate space.
    #[error("board layout is too large")]
    TooLarge,
    /// A cell named a kind the board does not deal.
    #[error("kind {value} at {position} exceeds the {kinds} kinds in play")]
    KindOutOfRange {
        /// Offending cell.
        position: Position,
        /// Kind number found in the layout.
        value: u8,
        /// Number of kinds the board deals.
        kinds: u8,
    },
}
