//! Game loop connecting the world to the terminal.

use std::{
    io::{BufRead, Write},
    thread,
};

use anyhow::{Context, Result};
use match_three_core::{Command, Event};
use match_three_system_autoplay::{hint, Autoplay};
use match_three_system_best_score::{BestScore, BestScoreStore};
use match_three_system_playback::Playback;
use match_three_world::{self as world, query, Config, World};

use crate::{
    board,
    input::{self, Input},
};

/// Presentation switches chosen on the command line.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Options {
    /// Print events as JSON lines.
    pub(crate) json: bool,
    /// Sleep through each event's hold instead of flushing the script at once.
    pub(crate) paced: bool,
    /// Stop after this many accepted swaps.
    pub(crate) max_turns: Option<u64>,
}

/// Totals reported when the session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    /// Accepted swaps across every game of the session.
    pub(crate) turns: u64,
    /// Score of the game in progress when the session ended.
    pub(crate) score: u32,
    /// Best score known to the store.
    pub(crate) best: u32,
}

/// One terminal session, possibly spanning several games.
pub(crate) struct Session {
    world: World,
    playback: Playback,
    best: BestScore,
    store: Box<dyn BestScoreStore>,
    autoplay: Option<Autoplay>,
    options: Options,
    last_events: Vec<Event>,
    turns: u64,
}

impl Session {
    /// Deals the first game and presents it.
    pub(crate) fn start<W: Write>(
        config: Config,
        store: Box<dyn BestScoreStore>,
        playback: Playback,
        autoplay: Option<Autoplay>,
        options: Options,
        out: &mut W,
    ) -> Result<Self> {
        let best = BestScore::load(store.as_ref()).context("failed to load the best score")?;
        let mut events = Vec::new();
        let world = World::new(config, &mut events);

        let mut session = Self {
            world,
            playback,
            best,
            store,
            autoplay,
            options,
            last_events: Vec::new(),
            turns: 0,
        };
        session.report_anomaly();
        session.present(events, out)?;
        Ok(session)
    }

    /// Plays until input runs out, the player quits, the turn limit is hit,
    /// or autoplay runs out of moves.
    pub(crate) fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<Summary> {
        let mut lines = input.lines();

        loop {
            if self
                .options
                .max_turns
                .is_some_and(|limit| self.turns >= limit)
            {
                break;
            }

            let command = if self.autoplay.is_some() {
                match self.autoplay_command() {
                    Some(command) => command,
                    None => break,
                }
            } else {
                self.prompt(out)?;
                let Some(line) = lines.next() else {
                    break;
                };
                let line = line.context("failed to read a move")?;
                match input::parse(&line) {
                    Ok(Input::Swap(first, second)) => Command::RequestSwap { first, second },
                    Ok(Input::Restart) => Command::Restart,
                    Ok(Input::Hint) => {
                        self.show_hint(out)?;
                        continue;
                    }
                    Ok(Input::Quit) => break,
                    Err(error) => {
                        self.note(out, &error.to_string())?;
                        continue;
                    }
                }
            };

            if let Command::RequestSwap { first, second } = command {
                if let Err(reason) = query::validate_swap(&self.world, first, second) {
                    self.note(out, &format!("ignored: {reason}"))?;
                    continue;
                }
            }

            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            if command == Command::Restart {
                self.report_anomaly();
            }
            self.present(events, out)?;
        }

        out.flush().context("failed to flush output")?;
        Ok(Summary {
            turns: self.turns,
            score: query::score(&self.world),
            best: self.best.best(),
        })
    }

    fn autoplay_command(&mut self) -> Option<Command> {
        let autoplay = self.autoplay.as_mut()?;
        let mut commands = Vec::new();
        autoplay.handle(&self.last_events, query::grid(&self.world), &mut commands);
        commands.pop()
    }

    fn present<W: Write>(&mut self, events: Vec<Event>, out: &mut W) -> Result<()> {
        self.turns += events
            .iter()
            .filter(|event| matches!(event, Event::SwapAccepted { .. }))
            .count() as u64;
        let _ = self
            .best
            .handle(&events, self.store.as_mut())
            .context("failed to save the best score")?;

        self.playback.handle(&events);
        let mut released = Vec::new();
        if self.options.paced {
            loop {
                self.playback.advance(self.playback.remaining_hold(), &mut released);
                self.write_events(&released, out)?;
                released.clear();
                if self.playback.pending() == 0 && self.playback.remaining_hold().is_zero() {
                    break;
                }
                thread::sleep(self.playback.remaining_hold());
            }
        } else {
            self.playback.flush(&mut released);
            self.write_events(&released, out)?;
        }

        if !self.options.json {
            self.write_board(out)?;
        }
        self.last_events = events;
        Ok(())
    }

    fn write_events<W: Write>(&self, events: &[Event], out: &mut W) -> Result<()> {
        for event in events {
            if self.options.json {
                let line = serde_json::to_string(event).context("failed to encode an event")?;
                writeln!(out, "{line}")?;
            } else if let Some(line) = board::describe(event) {
                writeln!(out, "{line}")?;
            }
        }
        out.flush()?;
        Ok(())
    }

    fn write_board<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{}", board::render(query::grid(&self.world)))?;
        writeln!(
            out,
            "score {}  best {}",
            query::score(&self.world),
            self.best.best()
        )?;
        Ok(())
    }

    fn prompt<W: Write>(&self, out: &mut W) -> Result<()> {
        if !self.options.json {
            write!(out, "> ")?;
            out.flush()?;
        }
        Ok(())
    }

    fn show_hint<W: Write>(&self, out: &mut W) -> Result<()> {
        let message = match hint(query::grid(&self.world)) {
            Some((first, second)) => format!("try swapping {first} and {second}"),
            None => "no swap makes a match".to_owned(),
        };
        self.note(out, &message)
    }

    /// Player-facing message. JSON output keeps these on stderr.
    fn note<W: Write>(&self, out: &mut W, message: &str) -> Result<()> {
        if self.options.json {
            eprintln!("{message}");
        } else {
            writeln!(out, "{message}")?;
        }
        Ok(())
    }

    fn report_anomaly(&self) {
        if let Some(anomaly) = query::initialization_anomaly(&self.world) {
            eprintln!("warning: {anomaly}");
        }
    }
}
