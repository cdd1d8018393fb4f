use thiserror::Error;

use crate::board::Move;

/// Errors raised by the board and the search engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error(
        "board {width}x{height} is too small for {n_in_row} in a row; \
         width and height cannot be less than {n_in_row}"
    )]
    BoardTooSmall {
        width: usize,
        height: usize,
        n_in_row: usize,
    },

    #[error("invalid move: {0} is out of range or already occupied")]
    InvalidMove(Move),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no legal moves available")]
    NoLegalMoves,
}

/// Convenience Result type for board and search operations.
pub type Result<T> = std::result::Result<T, GameError>;
