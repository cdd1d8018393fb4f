//! MCTS player, the engine as seen by a game loop.

use crate::board::{Board, Move};
use crate::error::Result;
use crate::mcts::Mcts;

/// A computer player backed by an MCTS engine.
///
/// The game loop asks it for moves with [`MctsPlayer::request_move`] and must
/// report every move actually played, its own and the opponent's, through
/// [`MctsPlayer::notify_move_played`] so the search tree follows the game.
#[derive(Debug)]
pub struct MctsPlayer {
    mcts: Mcts,
}

impl MctsPlayer {
    pub fn new(c_puct: f64, n_playout: usize) -> Result<Self> {
        Ok(Self::from_engine(Mcts::new(c_puct, n_playout)?))
    }

    /// Wrap an already configured engine.
    pub fn from_engine(mcts: Mcts) -> Self {
        Self { mcts }
    }

    #[inline]
    pub fn engine(&self) -> &Mcts {
        &self.mcts
    }

    /// Choose a move for the player to move on `board`.
    pub fn request_move(&mut self, board: &Board) -> Result<Move> {
        self.mcts.get_action(board)
    }

    /// Tell the engine that `action` was played.
    pub fn notify_move_played(&mut self, action: Move) {
        self.mcts.advance(action);
    }

    /// Forget the current game.
    pub fn reset(&mut self) {
        self.mcts.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Player;

    #[test]
    fn test_follows_both_sides_of_a_game() {
        let mut board = Board::new(4, 4, 3, Player::First).unwrap();
        let mut player = MctsPlayer::from_engine(Mcts::with_seed(5.0, 100, 9).unwrap());

        while board.check_end().is_none() {
            let m = if board.current_player() == Player::First {
                player.request_move(&board).unwrap()
            } else {
                // Opponent always takes the lowest free cell
                board.available_moves().next().unwrap()
            };
            board.apply_move(m).unwrap();
            player.notify_move_played(m);
        }
        assert!(board.check_end().is_some());
    }

    #[test]
    fn test_reset() {
        let board = Board::new(3, 3, 3, Player::First).unwrap();
        let mut player = MctsPlayer::from_engine(Mcts::with_seed(5.0, 20, 1).unwrap());
        player.request_move(&board).unwrap();
        assert_eq!(player.engine().root_visits(), 20);

        player.reset();
        assert_eq!(player.engine().root_visits(), 0);
        assert_eq!(player.engine().tree().len(), 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(MctsPlayer::new(5.0, 0).is_err());
        assert!(MctsPlayer::new(5.0, 1).is_ok());
    }
}
