//! Default configuration for the board and the search.
//!
//! Every value here can be overridden at runtime from the command line; these
//! are the values a plain `gomoku-mcts` invocation plays with.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board width.
pub const DEFAULT_WIDTH: usize = 9;

/// Default board height.
pub const DEFAULT_HEIGHT: usize = 9;

/// Default number of consecutive stones needed to win.
pub const DEFAULT_N_IN_ROW: usize = 5;

/// Default index of the player who moves first (0 or 1).
pub const DEFAULT_START_PLAYER: usize = 1;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Exploration constant balancing Q against the prior-weighted bonus.
pub const DEFAULT_C_PUCT: f64 = 5.0;

/// Number of playouts run per real move.
pub const DEFAULT_N_PLAYOUT: usize = 10_000;

/// Maximum number of simulated moves in a single rollout.
pub const ROLLOUT_ROUND_LIMIT: usize = 1000;

/// Prior given to a freshly created root.
pub const ROOT_PRIOR: f64 = 1.0;

// =============================================================================
// Line Directions
// =============================================================================

/// Unit steps `(dx, dy)` for the four axes a winning line can lie on.
/// Order: horizontal, vertical, diagonal, anti-diagonal.
pub const AXES: [(isize, isize); 4] = [
    (1, 0),  // horizontal
    (0, 1),  // vertical
    (1, 1),  // diagonal (down-right)
    (1, -1), // anti-diagonal (up-right)
];

// =============================================================================
// Rendering
// =============================================================================

/// Symbol for the first player's stones.
pub const STONE_FIRST: char = 'X';

/// Symbol for the second player's stones.
pub const STONE_SECOND: char = 'O';

/// Symbol for an empty cell.
pub const EMPTY: char = '.';
