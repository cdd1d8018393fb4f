//! Board state for a k-in-a-row game.
//!
//! The grid is stored as a flat vector indexed by move number, where a move
//! is the cell index `y * width + x`. A cell is available exactly when it is
//! empty, so the available set is derived from the grid and the two can never
//! disagree.

use std::fmt;

use crate::constants::{AXES, EMPTY, STONE_FIRST, STONE_SECOND};
use crate::error::{GameError, Result};

/// A move, represented as a cell index into the flat grid.
pub type Move = usize;

/// One of the two players.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    First,
    Second,
}

impl Player {
    /// The player who moves after this one.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    /// Player number (0 for `First`, 1 for `Second`).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }

    /// Player for a player number; anything other than 0 maps to `Second`.
    pub fn from_index(index: usize) -> Self {
        if index == 0 { Player::First } else { Player::Second }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// How a finished game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win(Player),
    Draw,
}

impl Outcome {
    /// The winning player, if any.
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Win(p) => Some(p),
            Outcome::Draw => None,
        }
    }
}

/// The state of a game in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    n_in_row: usize,
    /// Occupant of each cell, `None` if empty
    cells: Vec<Option<Player>>,
    current: Player,
    /// Number of empty cells
    n_available: usize,
    last_move: Option<Move>,
}

impl Board {
    /// Create an empty board.
    ///
    /// # Errors
    /// `GameError::BoardTooSmall` if either dimension is shorter than
    /// `n_in_row`, or if `n_in_row` is zero. `GameError::InvalidConfig` if
    /// the cell count does not fit in a `usize`.
    pub fn new(width: usize, height: usize, n_in_row: usize, start_player: Player) -> Result<Self> {
        if n_in_row == 0 || width < n_in_row || height < n_in_row {
            return Err(GameError::BoardTooSmall {
                width,
                height,
                n_in_row,
            });
        }
        let size = width.checked_mul(height).ok_or_else(|| {
            GameError::InvalidConfig(format!("a {width}x{height} board has too many cells"))
        })?;
        Ok(Self {
            width,
            height,
            n_in_row,
            cells: vec![None; size],
            current: start_player,
            n_available: size,
            last_move: None,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn n_in_row(&self) -> usize {
        self.n_in_row
    }

    /// Total number of cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// The player to move.
    #[inline]
    pub fn current_player(&self) -> Player {
        self.current
    }

    /// The last move played, `None` before the first move.
    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Number of moves applied so far.
    #[inline]
    pub fn move_count(&self) -> usize {
        self.size() - self.n_available
    }

    /// Number of empty cells.
    #[inline]
    pub fn available_count(&self) -> usize {
        self.n_available
    }

    /// All available moves in ascending index order.
    pub fn available_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(m, _)| m)
    }

    /// True if `m` is on the board and empty.
    #[inline]
    pub fn is_available(&self, m: Move) -> bool {
        m < self.size() && self.cells[m].is_none()
    }

    /// Occupant of `(x, y)`, `None` if empty or off the board.
    pub fn cell(&self, x: usize, y: usize) -> Option<Player> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }

    /// Convert a move to its `(x, y)` location.
    #[inline]
    pub fn move_to_location(&self, m: Move) -> (usize, usize) {
        (m % self.width, m / self.width)
    }

    /// Convert a location to a move, `None` if it is off the board.
    pub fn location_to_move(&self, x: usize, y: usize) -> Option<Move> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Place the current player's stone at `m` and pass the turn.
    ///
    /// # Errors
    /// `GameError::InvalidMove` if `m` is off the board or occupied. The
    /// board is left untouched in that case.
    pub fn apply_move(&mut self, m: Move) -> Result<()> {
        if !self.is_available(m) {
            return Err(GameError::InvalidMove(m));
        }
        self.cells[m] = Some(self.current);
        self.n_available -= 1;
        self.current = self.current.opponent();
        self.last_move = Some(m);
        Ok(())
    }

    /// Check whether the game has ended.
    ///
    /// Only lines through the last move are examined, which is enough as long
    /// as this is called after every move. A win on the final empty cell is
    /// reported as a win, not a draw.
    pub fn check_end(&self) -> Option<Outcome> {
        let last = self.last_move?;
        let (x, y) = self.move_to_location(last);
        let player = self.cells[last]?;

        let won = AXES
            .iter()
            .map(|&(dx, dy)| self.run_length(x, y, dx, dy, player))
            .any(|run| run >= self.n_in_row);
        if won {
            return Some(Outcome::Win(player));
        }

        if self.n_available == 0 {
            return Some(Outcome::Draw);
        }
        None
    }

    /// Length of the run of `player` stones through `(x, y)` along one axis.
    fn run_length(&self, x: usize, y: usize, dx: isize, dy: isize, player: Player) -> usize {
        1 + self.count_direction(x, y, dx, dy, player) + self.count_direction(x, y, -dx, -dy, player)
    }

    /// Count consecutive `player` stones from `(x, y)` stepping by `(dx, dy)`,
    /// not counting the starting cell.
    fn count_direction(&self, x: usize, y: usize, dx: isize, dy: isize, player: Player) -> usize {
        let mut count = 0;
        let (mut cx, mut cy) = (x as isize, y as isize);
        loop {
            cx += dx;
            cy += dy;
            if cx < 0 || cy < 0 {
                break;
            }
            if self.cell(cx as usize, cy as usize) != Some(player) {
                break;
            }
            count += 1;
        }
        count
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pad every column to the width of the largest index
        let digits = self.width.max(self.height).saturating_sub(1).to_string().len();

        for x in 0..self.width {
            write!(f, "{x:<digits$} ")?;
        }
        writeln!(f)?;
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = match self.cell(x, y) {
                    Some(Player::First) => STONE_FIRST,
                    Some(Player::Second) => STONE_SECOND,
                    None => EMPTY,
                };
                write!(f, "{ch:<digits$} ")?;
            }
            writeln!(f, "{y:<digits$}")?;
        }
        Ok(())
    }
}
