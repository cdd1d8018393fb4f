//! Text game session.
//!
//! Runs a game between two participants, each either a human typing moves
//! as `x y` or an MCTS player. Input and output are generic so the loop can
//! be driven from stdin/stdout or from a script.
//!
//! ## Example
//!
//! ```ignore
//! use gomoku_mcts::board::{Board, Player};
//! use gomoku_mcts::game::{Game, Participant};
//! use gomoku_mcts::player::MctsPlayer;
//!
//! let board = Board::new(9, 9, 5, Player::Second)?;
//! let ai = MctsPlayer::new(5.0, 10_000)?;
//! let mut game = Game::new(board, Participant::Human, Participant::Mcts(ai), true);
//! game.run(&mut std::io::stdin().lock(), &mut std::io::stdout())?;
//! ```

use std::io::{BufRead, Write};

use anyhow::{Context, bail};
use tracing::info;

use crate::board::{Board, Move, Outcome, Player};
use crate::player::MctsPlayer;

/// Who supplies the moves for one side.
#[derive(Debug)]
pub enum Participant {
    Human,
    Mcts(MctsPlayer),
}

/// A game in progress.
#[derive(Debug)]
pub struct Game {
    board: Board,
    /// Indexed by `Player::index()`
    participants: [Participant; 2],
    show_board: bool,
}

impl Game {
    /// `first` plays `Player::First` (X), `second` plays `Player::Second` (O).
    pub fn new(board: Board, first: Participant, second: Participant, show_board: bool) -> Self {
        Self {
            board,
            participants: [first, second],
            show_board,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Play until the game ends and return how it ended.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> anyhow::Result<Outcome> {
        if self.show_board {
            self.draw(output)?;
        }

        loop {
            let player = self.board.current_player();
            let m = match &mut self.participants[player.index()] {
                Participant::Human => read_human_move(&self.board, player, input, output)?,
                Participant::Mcts(ai) => {
                    let m = ai
                        .request_move(&self.board)
                        .with_context(|| format!("search failed for player {player}"))?;
                    let (x, y) = self.board.move_to_location(m);
                    writeln!(output, "Player {player} plays {x} {y}")?;
                    m
                }
            };

            self.board
                .apply_move(m)
                .with_context(|| format!("player {player} chose an unplayable move"))?;
            for participant in &mut self.participants {
                if let Participant::Mcts(ai) = participant {
                    ai.notify_move_played(m);
                }
            }

            if self.show_board {
                self.draw(output)?;
            }

            if let Some(outcome) = self.board.check_end() {
                match outcome {
                    Outcome::Win(winner) => writeln!(output, "Game end. Winner is player {winner}.")?,
                    Outcome::Draw => writeln!(output, "Game end. Tie.")?,
                }
                info!(?outcome, moves = self.board.move_count(), "game over");
                return Ok(outcome);
            }
        }
    }

    /// Print the seat legend, `Player <seat>: <player number> with <stone>`,
    /// followed by the board.
    fn draw<W: Write>(&self, output: &mut W) -> anyhow::Result<()> {
        writeln!(output, "Player 1: {} with X", Player::First)?;
        writeln!(output, "Player 2: {} with O", Player::Second)?;
        writeln!(output)?;
        writeln!(output, "{}", self.board)?;
        Ok(())
    }
}

/// Prompt until the human enters an available cell.
fn read_human_move<R: BufRead, W: Write>(
    board: &Board,
    player: Player,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<Move> {
    writeln!(output, "Player {player}'s turn.")?;
    write!(output, "Enter your move (format: x y): ")?;
    output.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line).context("failed to read move")? == 0 {
            bail!("input closed before player {player} moved");
        }

        let m = parse_location(&line)
            .and_then(|(x, y)| board.location_to_move(x, y))
            .filter(|&m| board.is_available(m));
        if let Some(m) = m {
            return Ok(m);
        }

        write!(output, "Invalid move. Enter your move (format: x y): ")?;
        output.flush()?;
    }
}

/// Parse a location typed as two whitespace-separated numbers, `x y`.
pub fn parse_location(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}
