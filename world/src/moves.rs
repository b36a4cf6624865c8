//! Legal move search used for deadlock detection and hints.

use match_three_core::Position;

use crate::grid::Grid;

/// Reports whether swapping the two positions would leave a run anywhere on the board.
///
/// Positions that are off the board or not adjacent never form a legal swap.
#[must_use]
pub fn swap_creates_match(grid: &Grid, first: Position, second: Position) -> bool {
    let dimensions = grid.dimensions();
    if !first.is_adjacent(second) || !dimensions.contains(first) || !dimensions.contains(second) {
        return false;
    }
    let mut scratch = grid.clone();
    scratch.swap(first, second);
    scratch.has_match()
}

/// Reports whether at least one adjacent swap produces a match.
///
/// A settled board for which this returns `false` is deadlocked.
#[must_use]
pub fn has_any_legal_move(grid: &Grid) -> bool {
    first_legal_swap(grid).is_some()
}

/// First legal swap in scan order: cells row-major, right neighbour before lower neighbour.
#[must_use]
pub fn first_legal_swap(grid: &Grid) -> Option<(Position, Position)> {
    let mut found = None;
    visit_legal_swaps(grid, |first, second| {
        found = Some((first, second));
        true
    });
    found
}

/// Every legal swap in scan order.
#[must_use]
pub fn legal_swaps(grid: &Grid) -> Vec<(Position, Position)> {
    let mut swaps = Vec::new();
    visit_legal_swaps(grid, |first, second| {
        swaps.push((first, second));
        false
    });
    swaps
}

/// Swaps each cell with its right and lower neighbours on a scratch copy,
/// stopping once `visit` returns `true`.
fn visit_legal_swaps<F>(grid: &Grid, mut visit: F)
where
    F: FnMut(Position, Position) -> bool,
{
    let dimensions = grid.dimensions();
    let mut scratch = grid.clone();

    for position in dimensions.positions() {
        let right = position
            .column()
            .checked_add(1)
            .map(|column| Position::new(position.row(), column));
        let below = position
            .row()
            .checked_add(1)
            .map(|row| Position::new(row, position.column()));

        for neighbour in [right, below].into_iter().flatten() {
            if !dimensions.contains(neighbour) {
                continue;
            }
            scratch.swap(position, neighbour);
            let creates_match = scratch.has_match();
            scratch.swap(position, neighbour);
            if creates_match && visit(position, neighbour) {
                return;
            }
        }
    }
}
