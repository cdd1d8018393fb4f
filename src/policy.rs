//! Move policies used by the search.
//!
//! - The prior policy seeds the `p` of newly expanded tree nodes.
//! - The rollout policy scores moves during simulation; the rollout then
//!   plays the highest scoring move.
//!
//! Both return `(move, score)` pairs for every available move in ascending
//! move order and never touch the board.

use crate::board::{Board, Move};

/// Uniform prior over the available moves.
pub fn prior_policy(board: &Board) -> Vec<(Move, f64)> {
    let count = board.available_count();
    if count == 0 {
        return Vec::new();
    }
    let p = 1.0 / count as f64;

    let mut priors = Vec::with_capacity(count);
    priors.extend(board.available_moves().map(|m| (m, p)));
    priors
}

/// Random rollout scores: a fresh score in `[0, 1)` for every available move.
pub fn rollout_policy(board: &Board, rng: &mut fastrand::Rng) -> Vec<(Move, f64)> {
    let mut scores = Vec::with_capacity(board.available_count());
    scores.extend(board.available_moves().map(|m| (m, rng.f64())));
    scores
}

/// The move with the greatest score. Ties go to the earliest entry.
pub fn greedy_action(scores: &[(Move, f64)]) -> Option<Move> {
    let mut best: Option<(Move, f64)> = None;
    for &(m, score) in scores {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((m, score)),
        }
    }
    best.map(|(m, _)| m)
}
