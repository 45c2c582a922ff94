mod board;
mod config;
mod engine;
mod error;
mod game;
mod snake;
mod term;
mod timer;

use std::{fs::File, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};
use simplelog::WriteLogger;

use config::{Config, DEFAULT_SNAKE_LENGTH, DEFAULT_TILE_COUNT, DEFAULT_UPDATE_INTERVAL_MS, MAX_TILE_COUNT};

pub type TermInt = u16;
pub type Coords = (u16, u16);

/// Grid snake for the terminal.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Tiles along each side of the square board.
    #[arg(long, value_name = "TILES", default_value_t = DEFAULT_TILE_COUNT,
          value_parser = clap::value_parser!(u32).range(1..=MAX_TILE_COUNT as i64))]
    tile_count: u32,
    /// Length of the snake at the start of each game, head included.
    #[arg(long = "initial-length", value_name = "TILES", default_value_t = DEFAULT_SNAKE_LENGTH,
          value_parser = clap::value_parser!(u32).range(1..))]
    initial_length: u32,
    /// Milliseconds between two moves of the snake.
    #[arg(long = "interval-ms", value_name = "MILLISECONDS", default_value_t = DEFAULT_UPDATE_INTERVAL_MS,
          value_parser = clap::value_parser!(u64).range(1..=60_000))]
    interval_ms: u64,
    /// Seed for apple placement, for reproducible games.
    #[arg(long)]
    seed: Option<u64>,
    /// Draw a dot on every empty tile.
    #[arg(long)]
    grid: bool,
    /// Where to write the log; the terminal itself is taken by the game.
    #[arg(long, value_name = "PATH", default_value = "snake.log")]
    log_file: PathBuf,
    /// Log every turn and apple placement.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            tile_count: self.tile_count,
            initial_snake_length: self.initial_length,
            update_interval: Duration::from_millis(self.interval_ms),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let log_file = File::create(&args.log_file)
        .with_context(|| format!("could not create log file {}", args.log_file.display()))?;
    WriteLogger::init(level, simplelog::Config::default(), log_file).context("failed to set up logging")?;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!("Starting with {:?}", args.config());

    let mut game = game::SnakeGame::new(args.config(), rng, args.grid).context("invalid game settings")?;

    // The main game loop returns on CTRL+C; the terminal is restored either way
    let played = game.initialize().and_then(|_| game.play());
    game.restore()?;
    played
}
