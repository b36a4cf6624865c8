//! Text rendering of the board and the event stream.

use std::fmt::Write as _;

use match_three_core::{Event, Position, TileKind};
use match_three_world::Grid;

const GLYPHS: [char; 10] = ['R', 'Y', 'D', 'G', 'B', 'O', 'P', 'C', 'M', 'W'];
const EMPTY_GLYPH: char = '.';

/// Glyph printed for a tile kind.
pub(crate) fn glyph(kind: TileKind) -> char {
    GLYPHS
        .get(usize::from(kind.get()).saturating_sub(1))
        .copied()
        .unwrap_or('?')
}

/// Draws the board with zero-based row and column labels.
pub(crate) fn render(grid: &Grid) -> String {
    let dimensions = grid.dimensions();
    let mut text = String::from("   ");
    for column in 0..dimensions.columns() {
        let _ = write!(text, " {column}");
    }
    text.push('\n');

    for row in 0..dimensions.rows() {
        let _ = write!(text, "{row:>3}");
        for column in 0..dimensions.columns() {
            let symbol = grid
                .kind_at(Position::new(row, column))
                .map_or(EMPTY_GLYPH, glyph);
            let _ = write!(text, " {symbol}");
        }
        text.push('\n');
    }
    text
}

/// One-line description of an event, or `None` when there is nothing to say.
pub(crate) fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::GameInitialized { .. } => "new game".to_owned(),
        Event::SwapAccepted { first, second, .. } => format!("swapped {first} and {second}"),
        Event::SwapRejectedNoMatch { first, second } => {
            format!("no match: {first} and {second} swapped back")
        }
        Event::MatchesCleared { cleared, score, .. } => {
            format!("cleared {cleared} tiles, score {score}")
        }
        Event::TilesFell { falls } if falls.is_empty() => return None,
        Event::TilesFell { falls } => format!("{} tiles fell", falls.len()),
        Event::TilesSpawned { spawns } => format!("{} new tiles", spawns.len()),
        Event::GameOver { score } => format!("game over: no moves left, final score {score}"),
        Event::GameRestarted { .. } => "board reshuffled, score reset".to_owned(),
    };
    Some(line)
}
