#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Paces a turn's event script over simulated time.
//!
//! The world resolves a whole turn inside one call. Presentation layers feed
//! the resulting events through [`Playback`] and release them one by one as
//! their animations finish, gating player input until the script has played
//! out.

use std::{collections::VecDeque, time::Duration};

use match_three_core::Event;

/// Hold durations applied after each kind of event is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    swap: Duration,
    rejected_swap: Duration,
    clear: Duration,
    fall: Duration,
    spawn: Duration,
    spawn_stagger: Duration,
}

impl Config {
    /// Creates a configuration with explicit hold durations.
    #[must_use]
    pub const fn new(
        swap: Duration,
        rejected_swap: Duration,
        clear: Duration,
        fall: Duration,
        spawn: Duration,
        spawn_stagger: Duration,
    ) -> Self {
        Self {
            swap,
            rejected_swap,
            clear,
            fall,
            spawn,
            spawn_stagger,
        }
    }

    /// Configuration that releases every event immediately.
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(
            Duration::ZERO,
            Duration::ZERO,
            Duration::ZERO,
            Duration::ZERO,
            Duration::ZERO,
            Duration::ZERO,
        )
    }

    /// Scales every hold to `percent` of its length.
    #[must_use]
    pub fn scaled(self, percent: u32) -> Self {
        let scale = |duration: Duration| duration.saturating_mul(percent) / 100;
        Self::new(
            scale(self.swap),
            scale(self.rejected_swap),
            scale(self.clear),
            scale(self.fall),
            scale(self.spawn),
            scale(self.spawn_stagger),
        )
    }

    /// Hold that follows the release of `event`.
    #[must_use]
    pub fn hold_for(&self, event: &Event) -> Duration {
        match event {
            Event::SwapAccepted { .. } => self.swap,
            Event::SwapRejectedNoMatch { .. } => self.rejected_swap,
            Event::MatchesCleared { .. } => self.clear,
            Event::TilesFell { falls } if falls.is_empty() => Duration::ZERO,
            Event::TilesFell { .. } => self.fall,
            Event::TilesSpawned { spawns } => {
                let staggered = u32::try_from(spawns.len().saturating_sub(1)).unwrap_or(u32::MAX);
                self.spawn
                    .saturating_add(self.spawn_stagger.saturating_mul(staggered))
            }
            Event::GameInitialized { .. }
            | Event::GameRestarted { .. }
            | Event::GameOver { .. } => Duration::ZERO,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(600),
            Duration::from_millis(900),
            Duration::from_millis(400),
            Duration::from_millis(500),
            Duration::from_millis(600),
            Duration::from_millis(50),
        )
    }
}

/// Queue that releases events once the previous event's hold has elapsed.
#[derive(Debug)]
pub struct Playback {
    config: Config,
    queue: VecDeque<Event>,
    hold: Duration,
    game_over: bool,
}

impl Playback {
    /// Creates an empty playback queue using the supplied hold durations.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            hold: Duration::ZERO,
            game_over: false,
        }
    }

    /// Enqueues events produced by the world, preserving their order.
    pub fn handle(&mut self, events: &[Event]) {
        self.queue.extend(events.iter().cloned());
    }

    /// Advances simulated time by `dt`, releasing every event whose start time
    /// has been reached into `out`.
    ///
    /// The head of an idle queue is released at once, even for a zero `dt`.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let mut budget = dt;
        loop {
            if self.hold > budget {
                self.hold -= budget;
                return;
            }
            budget -= self.hold;
            self.hold = Duration::ZERO;

            let Some(event) = self.queue.pop_front() else {
                return;
            };
            self.release(event, out);
        }
    }

    /// Releases everything still queued, skipping the remaining holds.
    pub fn flush(&mut self, out: &mut Vec<Event>) {
        while let Some(event) = self.queue.pop_front() {
            self.release(event, out);
        }
        self.hold = Duration::ZERO;
    }

    /// Reports whether a new player command may be issued.
    ///
    /// Input stays closed after a released [`Event::GameOver`] until an
    /// [`Event::GameRestarted`] has been released.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        self.queue.is_empty() && self.hold.is_zero() && !self.game_over
    }

    /// Number of events waiting to be released.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Time left before the next event may be released.
    #[must_use]
    pub fn remaining_hold(&self) -> Duration {
        self.hold
    }

    fn release(&mut self, event: Event, out: &mut Vec<Event>) {
        self.hold = self.config.hold_for(&event);
        match event {
            Event::GameOver { .. } => self.game_over = true,
            Event::GameInitialized { .. } | Event::GameRestarted { .. } => self.game_over = false,
            _ => {}
        }
        out.push(event);
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
