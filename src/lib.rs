//! Gomoku-MCTS: a k-in-a-row game engine driven by Monte Carlo Tree Search.
//!
//! The crate pairs a board model with an MCTS planner that uses a uniform
//! prior and random rollouts. The search tree is kept from move to move so
//! work spent on the line actually played is not thrown away.
//!
//! ## Modules
//!
//! - [`constants`] - Default board geometry and search parameters
//! - [`error`] - Error type shared by the board and the engine
//! - [`board`] - Board state, move legality, win/draw detection
//! - [`policy`] - Prior and rollout policies
//! - [`tree`] - Arena-allocated search tree
//! - [`mcts`] - Playouts, search, and tree reuse
//! - [`player`] - MCTS player facade for a game loop
//! - [`game`] - Text game session between humans and MCTS players
//!
//! ## Example
//!
//! ```
//! use gomoku_mcts::board::{Board, Player};
//! use gomoku_mcts::player::MctsPlayer;
//!
//! let mut board = Board::new(9, 9, 5, Player::First).unwrap();
//! board.apply_move(40).unwrap();
//!
//! // Search for the reply, then keep the engine in sync with the game
//! let mut ai = MctsPlayer::new(5.0, 200).unwrap();
//! ai.notify_move_played(40);
//! let reply = ai.request_move(&board).unwrap();
//! board.apply_move(reply).unwrap();
//! ai.notify_move_played(reply);
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod game;
pub mod mcts;
pub mod player;
pub mod policy;
pub mod tree;
