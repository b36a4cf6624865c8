//! Parsing of the lines typed at the prompt.

use match_three_core::Position;
use thiserror::Error;

/// Action requested by one line of input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Swap the tiles at two positions.
    Swap(Position, Position),
    /// Deal a new board and reset the score.
    Restart,
    /// Show a legal swap.
    Hint,
    /// Leave the game.
    Quit,
}

/// Reasons a line could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum InputError {
    /// Nothing but whitespace was typed.
    #[error("type a move as `r1 c1 r2 c2`, or restart, hint, quit")]
    Empty,
    /// A move did not have exactly four coordinates.
    #[error("a move needs four numbers `r1 c1 r2 c2`, found {found}")]
    WrongArity {
        /// Number of words typed.
        found: usize,
    },
    /// A coordinate was not a non-negative number.
    #[error("`{token}` is not a row or column number")]
    NotANumber {
        /// Offending word.
        token: String,
    },
}

/// Parses one line of input. Words are case-insensitive and may be separated
/// by whitespace or commas.
pub(crate) fn parse(line: &str) -> Result<Input, InputError> {
    let words: Vec<&str> = line
        .split(|character: char| character.is_whitespace() || character == ',')
        .filter(|word| !word.is_empty())
        .collect();

    match words.as_slice() {
        [] => Err(InputError::Empty),
        [word] if word.eq_ignore_ascii_case("restart") => Ok(Input::Restart),
        [word] if word.eq_ignore_ascii_case("hint") => Ok(Input::Hint),
        [word] if word.eq_ignore_ascii_case("quit") || word.eq_ignore_ascii_case("q") => {
            Ok(Input::Quit)
        }
        [r1, c1, r2, c2] => Ok(Input::Swap(
            Position::new(coordinate(r1)?, coordinate(c1)?),
            Position::new(coordinate(r2)?, coordinate(c2)?),
        )),
        [word] => Err(InputError::NotANumber {
            token: (*word).to_owned(),
        }),
        _ => Err(InputError::WrongArity { found: words.len() }),
    }
}

fn coordinate(word: &str) -> Result<u32, InputError> {
    word.parse().map_err(|_| InputError::NotANumber {
        token: word.to_owned(),
    })
}
