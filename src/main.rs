//! Gomoku-MCTS: play k-in-a-row against a Monte Carlo Tree Search engine.
//!
//! ## Usage
//!
//! - `gomoku-mcts` - Play against the engine (same as `play`)
//! - `gomoku-mcts play` - Human vs MCTS
//! - `gomoku-mcts human` - Human vs human
//! - `gomoku-mcts demo` - MCTS vs MCTS self-play
//!
//! Set `RUST_LOG=debug` to see search summaries.

use std::io;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gomoku_mcts::board::{Board, Player};
use gomoku_mcts::constants::{
    DEFAULT_C_PUCT, DEFAULT_HEIGHT, DEFAULT_N_IN_ROW, DEFAULT_N_PLAYOUT, DEFAULT_START_PLAYER,
    DEFAULT_WIDTH,
};
use gomoku_mcts::game::{Game, Participant};
use gomoku_mcts::mcts::Mcts;
use gomoku_mcts::player::MctsPlayer;

/// Gomoku-MCTS: a k-in-a-row MCTS engine
#[derive(Parser)]
#[command(name = "gomoku-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    config: GameArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the MCTS engine (you are player 0, X)
    Play,
    /// Two humans take turns at the same terminal
    Human,
    /// Let two MCTS engines play each other
    Demo,
}

#[derive(Args)]
struct GameArgs {
    /// Board width
    #[arg(long, default_value_t = DEFAULT_WIDTH, global = true)]
    width: usize,
    /// Board height
    #[arg(long, default_value_t = DEFAULT_HEIGHT, global = true)]
    height: usize,
    /// Stones in a row needed to win
    #[arg(long, default_value_t = DEFAULT_N_IN_ROW, global = true)]
    n_in_row: usize,
    /// Player who moves first (0 or 1)
    #[arg(long, default_value_t = DEFAULT_START_PLAYER as u8, global = true,
          value_parser = clap::value_parser!(u8).range(0..=1))]
    start_player: u8,
    /// Exploration constant
    #[arg(long, default_value_t = DEFAULT_C_PUCT, global = true)]
    c_puct: f64,
    /// Playouts per move
    #[arg(long, default_value_t = DEFAULT_N_PLAYOUT, global = true)]
    n_playout: usize,
    /// Seed for reproducible rollouts
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Do not print the board after each move
    #[arg(long, global = true)]
    quiet: bool,
}

impl GameArgs {
    fn board(&self) -> anyhow::Result<Board> {
        Board::new(
            self.width,
            self.height,
            self.n_in_row,
            Player::from_index(usize::from(self.start_player)),
        )
        .context("invalid board configuration")
    }

    /// Build an MCTS player; `offset` keeps seeded engines in one game apart.
    fn mcts_player(&self, offset: u64) -> anyhow::Result<MctsPlayer> {
        let mcts = match self.seed {
            Some(seed) => Mcts::with_seed(self.c_puct, self.n_playout, seed.wrapping_add(offset)),
            None => Mcts::new(self.c_puct, self.n_playout),
        }
        .context("invalid search configuration")?;
        Ok(MctsPlayer::from_engine(mcts))
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let args = &cli.config;

    // Validate everything before the game starts
    let board = args.board()?;
    let (first, second) = match cli.command {
        Some(Commands::Play) | None => (Participant::Human, Participant::Mcts(args.mcts_player(0)?)),
        Some(Commands::Human) => (Participant::Human, Participant::Human),
        Some(Commands::Demo) => (
            Participant::Mcts(args.mcts_player(0)?),
            Participant::Mcts(args.mcts_player(1)?),
        ),
    };

    let mut game = Game::new(board, first, second, !args.quiet);
    game.run(&mut io::stdin().lock(), &mut io::stdout().lock())?;
    Ok(())
}
