#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tracks the best score seen across games and forwards improvements to storage.

use match_three_core::Event;
use thiserror::Error;

/// Failure reported by a [`BestScoreStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage could not be read or written.
    #[error("best score storage failed")]
    Io(#[from] std::io::Error),
    /// The stored value is not a score.
    #[error("stored best score {contents:?} is not a number")]
    Corrupt {
        /// Raw stored contents.
        contents: String,
    },
}

/// Persistent home of the best score.
pub trait BestScoreStore {
    /// Loads the stored best score, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<u32>, StoreError>;

    /// Replaces the stored best score.
    fn save(&mut self, best: u32) -> Result<(), StoreError>;
}

/// Store that keeps the best score in memory for the lifetime of the process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    best: Option<u32>,
    saves: usize,
}

impl MemoryStore {
    /// Creates a store that already holds `best`.
    #[must_use]
    pub const fn with_best(best: u32) -> Self {
        Self {
            best: Some(best),
            saves: 0,
        }
    }

    /// Number of successful saves.
    #[must_use]
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u32>, StoreError> {
        Ok(self.best)
    }

    fn save(&mut self, best: u32) -> Result<(), StoreError> {
        self.best = Some(best);
        self.saves += 1;
        Ok(())
    }
}

/// Pure system that raises the best score from the event stream.
#[derive(Debug, Default)]
pub struct BestScore {
    best: u32,
}

impl BestScore {
    /// Creates a tracker seeded from whatever `store` already holds.
    pub fn load<S>(store: &S) -> Result<Self, StoreError>
    where
        S: BestScoreStore + ?Sized,
    {
        Ok(Self {
            best: store.load()?.unwrap_or(0),
        })
    }

    /// Best score known so far.
    #[must_use]
    pub const fn best(&self) -> u32 {
        self.best
    }

    /// Consumes world events, saving the best score when a reported score beats it.
    ///
    /// Returns the new best when it changed. The tracked best only moves once
    /// the store has accepted it.
    pub fn handle<S>(&mut self, events: &[Event], store: &mut S) -> Result<Option<u32>, StoreError>
    where
        S: BestScoreStore + ?Sized,
    {
        let candidate = events
            .iter()
            .filter_map(|event| match event {
                Event::MatchesCleared { score, .. } | Event::GameOver { score } => Some(*score),
                _ => None,
            })
            .max();

        match candidate {
            Some(score) if score > self.best => {
                store.save(score)?;
                self.best = score;
                Ok(Some(score))
            }
            _ => Ok(None),
        }
    }
}
