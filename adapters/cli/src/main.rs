#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Match Three in the terminal.

mod board;
mod input;
mod session;
mod store;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use match_three_system_autoplay::{self as autoplay, Autoplay, Strategy};
use match_three_system_best_score::{BestScoreStore, MemoryStore};
use match_three_system_playback::{self as playback, Playback};
use match_three_world as world;

use session::{Options, Session};
use store::FileStore;

/// Match-three tile puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "match-three",
    version,
    about = "Swap adjacent tiles to line up three or more of a kind.",
    long_about = "Swap adjacent tiles to line up three or more of a kind.\n\n\
        Type a move as four numbers `r1 c1 r2 c2` (zero-based row and column of \
        each tile), or one of: restart, hint, quit. The game ends when no swap \
        can make a match."
)]
struct Args {
    /// Seed for dealing and refilling tiles. Drawn at random when omitted.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Let the computer play instead of reading moves from stdin.
    #[arg(long)]
    autoplay: bool,

    /// How autoplay picks among the legal swaps.
    #[arg(long, default_value = "first", requires = "autoplay")]
    strategy: StrategyArg,

    /// Stop after this many accepted swaps.
    #[arg(long, value_name = "N")]
    max_turns: Option<u64>,

    /// File that keeps the best score between runs.
    #[arg(long, value_name = "FILE")]
    best_file: Option<PathBuf>,

    /// Play each turn back in real time at PERCENT of the animation length.
    #[arg(
        long,
        value_name = "PERCENT",
        num_args = 0..=1,
        default_missing_value = "100"
    )]
    pace: Option<u32>,

    /// Print events as JSON lines instead of text and boards.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// First legal swap in scan order.
    First,
    /// Random legal swap.
    Random,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::First => Self::FirstFound,
            StrategyArg::Random => Self::Random,
        }
    }
}

/// Entry point for the Match Three command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let store: Box<dyn BestScoreStore> = match &args.best_file {
        Some(path) => Box::new(FileStore::new(path.clone())),
        None => Box::new(MemoryStore::default()),
    };
    let playback = match args.pace {
        Some(percent) => Playback::new(playback::Config::default().scaled(percent)),
        None => Playback::new(playback::Config::instant()),
    };
    let autoplay = args
        .autoplay
        .then(|| Autoplay::new(autoplay::Config::new(args.strategy.into(), seed)));
    let options = Options {
        json: args.json,
        paced: args.pace.is_some(),
        max_turns: args.max_turns,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut session = Session::start(
        world::Config::default().with_seed(seed),
        store,
        playback,
        autoplay,
        options,
        &mut out,
    )
    .with_context(|| format!("failed to start a game with seed {seed}"))?;
    let summary = session.run(stdin.lock(), &mut out)?;

    if !args.json {
        eprintln!(
            "seed {seed}: {} turns, final score {}, best {}",
            summary.turns, summary.score, summary.best
        );
    }
    Ok(())
}
