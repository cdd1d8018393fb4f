//! Monte Carlo Tree Search (MCTS) engine.
//!
//! Each playout runs four phases on a private copy of the board:
//! - Selection: descend from the root by `Q + u` until an unexpanded node
//! - Expansion: add a child per available move, seeded by the prior policy
//! - Rollout: play greedy moves under random rollout scores to the end
//! - Backpropagation: update the path back to the root with alternating signs
//!
//! After the playout budget is spent, the most visited root child is played.
//! The tree is kept between real moves and advanced past each move played, so
//! statistics gathered under that move carry over to the next search.

use tracing::{debug, trace, warn};

use crate::board::{Board, Move, Outcome, Player};
use crate::constants::ROLLOUT_ROUND_LIMIT;
use crate::error::{GameError, Result};
use crate::policy::{greedy_action, prior_policy, rollout_policy};
use crate::tree::{NodeId, SearchTree};

/// Search statistics for one child of the root.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildStats {
    pub action: Move,
    pub visits: u32,
    pub q: f64,
    pub p: f64,
}

/// The MCTS planner.
#[derive(Debug)]
pub struct Mcts {
    tree: SearchTree,
    c_puct: f64,
    n_playout: usize,
    round_limit: usize,
    rng: fastrand::Rng,
}

impl Mcts {
    /// Create an engine with an entropy-seeded rollout generator.
    ///
    /// # Errors
    /// `GameError::InvalidConfig` unless `c_puct` is finite and positive and
    /// `n_playout` is at least one.
    pub fn new(c_puct: f64, n_playout: usize) -> Result<Self> {
        Self::with_rng(c_puct, n_playout, fastrand::Rng::new())
    }

    /// Create an engine whose rollouts are reproducible for a given seed.
    pub fn with_seed(c_puct: f64, n_playout: usize, seed: u64) -> Result<Self> {
        Self::with_rng(c_puct, n_playout, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(c_puct: f64, n_playout: usize, rng: fastrand::Rng) -> Result<Self> {
        if !(c_puct.is_finite() && c_puct > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "c_puct must be a positive number, got {c_puct}"
            )));
        }
        if n_playout == 0 {
            return Err(GameError::InvalidConfig(
                "n_playout must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            tree: SearchTree::new(),
            c_puct,
            n_playout,
            round_limit: ROLLOUT_ROUND_LIMIT,
            rng,
        })
    }

    /// Override the maximum number of moves simulated per rollout.
    pub fn with_round_limit(mut self, round_limit: usize) -> Self {
        self.round_limit = round_limit;
        self
    }

    #[inline]
    pub fn c_puct(&self) -> f64 {
        self.c_puct
    }

    #[inline]
    pub fn n_playout(&self) -> usize {
        self.n_playout
    }

    #[inline]
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Visit count of the current root.
    pub fn root_visits(&self) -> u32 {
        self.tree.get(self.tree.root()).visits()
    }

    /// Statistics for every root child, in creation order.
    pub fn root_children_stats(&self) -> Vec<ChildStats> {
        let root = self.tree.get(self.tree.root());
        root.children()
            .iter()
            .map(|&(action, id)| {
                let child = self.tree.get(id);
                ChildStats {
                    action,
                    visits: child.visits(),
                    q: child.q(),
                    p: child.p(),
                }
            })
            .collect()
    }

    /// Run one playout from the root, mutating `board` along the way.
    ///
    /// `board` must be a copy of the position the root stands for.
    pub fn playout(&mut self, board: &mut Board) -> Result<()> {
        let node = self.select_frontier(board)?;

        let priors = prior_policy(board);
        if board.check_end().is_none() {
            self.tree.expand(node, &priors);
        }

        let leaf_value = self.rollout(board, self.round_limit)?;

        // The move into `node` was made by the player before the one to act
        // at `node`, so the frontier's own value is the negated rollout result.
        self.tree.update_recursive(node, -leaf_value);
        Ok(())
    }

    /// Descend by selection until reaching an unexpanded node.
    fn select_frontier(&mut self, board: &mut Board) -> Result<NodeId> {
        let mut node = self.tree.root();
        while let Some((action, child)) = self.tree.select(node, self.c_puct) {
            board.apply_move(action)?;
            node = child;
        }
        Ok(node)
    }

    /// Play the rollout policy forward for at most `round_limit` moves.
    ///
    /// Returns `1.0` if the player to move at the start wins, `-1.0` if the
    /// opponent wins, and `0.0` for a draw or when the limit runs out.
    pub fn rollout(&mut self, board: &mut Board, round_limit: usize) -> Result<f64> {
        let player = board.current_player();

        for _ in 0..round_limit {
            if let Some(outcome) = board.check_end() {
                return Ok(outcome_value(outcome, player));
            }
            let scores = rollout_policy(board, &mut self.rng);
            let Some(action) = greedy_action(&scores) else {
                break;
            };
            board.apply_move(action)?;
        }

        match board.check_end() {
            Some(outcome) => Ok(outcome_value(outcome, player)),
            None => {
                warn!(round_limit, "rollout round limit reached, scoring as a draw");
                Ok(0.0)
            }
        }
    }

    /// Search `board` and return the most visited move.
    ///
    /// Every playout runs on a fresh clone, so `board` itself is never
    /// modified.
    ///
    /// # Errors
    /// `GameError::NoLegalMoves` if the root could not be expanded, which
    /// happens when `board` is already finished. `GameError::InvalidMove`
    /// if the tree does not match `board`, i.e. a played move was not
    /// reported through `advance`.
    pub fn get_action(&mut self, board: &Board) -> Result<Move> {
        for _ in 0..self.n_playout {
            let mut scratch = board.clone();
            self.playout(&mut scratch)?;
        }

        let root = self.tree.root();
        let (action, child) = self
            .tree
            .most_visited_child(root)
            .ok_or(GameError::NoLegalMoves)?;

        let chosen = self.tree.get(child);
        debug!(
            action,
            visits = chosen.visits(),
            q = chosen.q(),
            root_visits = self.root_visits(),
            tree_nodes = self.tree.len(),
            "search finished"
        );
        Ok(action)
    }

    /// Move the root past `action`, keeping its subtree if it was explored.
    pub fn advance(&mut self, action: Move) {
        let root = self.tree.root();
        match self.tree.find_child(root, action) {
            Some(child) => {
                self.tree.promote(child);
                trace!(action, visits = self.root_visits(), "reusing subtree");
            }
            None => {
                self.tree.reset();
                trace!(action, "move not in tree, starting a fresh root");
            }
        }
    }

    /// Discard all search statistics.
    pub fn reset(&mut self) {
        self.tree.reset();
    }
}

/// Value of a finished game for `player`.
fn outcome_value(outcome: Outcome, player: Player) -> f64 {
    match outcome {
        Outcome::Win(winner) if winner == player => 1.0,
        Outcome::Win(_) => -1.0,
        Outcome::Draw => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    fn engine(n_playout: usize) -> Mcts {
        Mcts::with_seed(5.0, n_playout, 1234).unwrap()
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(Mcts::new(0.0, 10), Err(GameError::InvalidConfig(_))));
        assert!(Mcts::new(-1.0, 10).is_err());
        assert!(Mcts::new(f64::NAN, 10).is_err());
        assert!(Mcts::new(f64::INFINITY, 10).is_err());
        assert!(matches!(Mcts::new(5.0, 0), Err(GameError::InvalidConfig(_))));
        assert!(Mcts::new(0.1, 1).is_ok());
    }

    #[test]
    fn test_outcome_value() {
        assert_eq!(outcome_value(Outcome::Win(Player::First), Player::First), 1.0);
        assert_eq!(outcome_value(Outcome::Win(Player::First), Player::Second), -1.0);
        assert_eq!(outcome_value(Outcome::Draw, Player::Second), 0.0);
    }

    #[test]
    fn test_rollout_on_finished_game() {
        // First player has just completed a row; second player is to move
        let mut board = Board::new(3, 3, 3, Player::First).unwrap();
        for m in [0, 3, 1, 4, 2] {
            board.apply_move(m).unwrap();
        }
        let mut mcts = engine(1);
        let before = board.clone();
        assert_eq!(mcts.rollout(&mut board, 1000).unwrap(), -1.0);
        assert_eq!(board, before, "a finished board gets no more moves");
    }

    #[test]
    fn test_rollout_plays_to_the_end() {
        let mut board = Board::new(3, 3, 3, Player::First).unwrap();
        let mut mcts = engine(1);
        let value = mcts.rollout(&mut board, 1000).unwrap();

        let outcome = board.check_end().expect("rollout should finish the game");
        assert_eq!(value, outcome_value(outcome, Player::First));
    }

    #[test]
    fn test_rollout_limit_scores_as_draw() {
        let mut board = Board::new(9, 9, 5, Player::First).unwrap();
        let mut mcts = engine(1);

        assert_eq!(mcts.rollout(&mut board, 0).unwrap(), 0.0);
        assert_eq!(board.move_count(), 0);

        // Three moves cannot finish a 5-in-a-row game
        assert_eq!(mcts.rollout(&mut board, 3).unwrap(), 0.0);
        assert_eq!(board.move_count(), 3);
    }

    /// Log sink shared between a test and the subscriber it installs.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_rollout_limit_logs_warning() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut board = Board::new(9, 9, 5, Player::First).unwrap();
            let mut mcts = engine(1);

            // A finished rollout is quiet
            let mut won = Board::new(3, 3, 3, Player::First).unwrap();
            for m in [0, 3, 1, 4, 2] {
                won.apply_move(m).unwrap();
            }
            mcts.rollout(&mut won, 0).unwrap();
            assert!(logs.contents().is_empty());

            assert_eq!(mcts.rollout(&mut board, 3).unwrap(), 0.0);
        });

        let text = logs.contents();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("rollout round limit reached"), "{text}");
        assert!(text.contains("round_limit=3"), "{text}");
    }

    #[test]
    fn test_round_limit_applies_to_playouts() {
        let board = Board::new(9, 9, 5, Player::First).unwrap();
        let mut mcts = engine(20).with_round_limit(0);
        mcts.get_action(&board).unwrap();

        // Every rollout was cut off, so every backed-up value is a draw
        assert_eq!(mcts.root_visits(), 20);
        assert_eq!(mcts.tree().get(mcts.tree().root()).q(), 0.0);
        assert!(mcts.root_children_stats().iter().all(|s| s.q == 0.0));
    }

    #[test]
    fn test_first_playout_expands_root() {
        let board = Board::new(3, 3, 3, Player::First).unwrap();
        let mut mcts = engine(1);
        let mut scratch = board.clone();
        mcts.playout(&mut scratch).unwrap();

        assert_eq!(mcts.root_visits(), 1);
        let stats = mcts.root_children_stats();
        assert_eq!(stats.len(), 9);
        assert!(stats.iter().all(|s| s.visits == 0));
        assert!(stats.iter().all(|s| (s.p - 1.0 / 9.0).abs() < 1e-12));
    }

    #[test]
    fn test_terminal_frontier_is_not_expanded() {
        // Root is a finished game
        let mut board = Board::new(3, 3, 3, Player::First).unwrap();
        for m in [0, 3, 1, 4, 2] {
            board.apply_move(m).unwrap();
        }
        let mut mcts = engine(4);
        assert_eq!(mcts.get_action(&board), Err(GameError::NoLegalMoves));
        assert_eq!(mcts.root_visits(), 4);
        assert_eq!(mcts.tree().len(), 1);
        // Second player to move has lost: the root is worth +1 to the winner
        let root = mcts.tree().get(mcts.tree().root());
        assert!((root.q() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_get_action_visits_and_board_untouched() {
        let board = Board::new(5, 5, 4, Player::Second).unwrap();
        let before = board.clone();
        let mut mcts = engine(300);

        let action = mcts.get_action(&board).unwrap();

        assert!(board.is_available(action));
        assert_eq!(board, before);
        assert_eq!(mcts.root_visits(), 300);
        let child_visits: u32 = mcts.root_children_stats().iter().map(|s| s.visits).sum();
        // Only the very first playout stops at the root itself
        assert_eq!(child_visits, 299);
    }

    #[test]
    fn test_get_action_takes_immediate_win() {
        //   X X .
        //   O O .
        //   . . .
        let mut board = Board::new(3, 3, 3, Player::First).unwrap();
        for m in [0, 3, 1, 4] {
            board.apply_move(m).unwrap();
        }
        let mut mcts = engine(2000);
        assert_eq!(mcts.get_action(&board).unwrap(), 2);
    }

    #[test]
    fn test_advance_into_explored_child() {
        let mut board = Board::new(3, 3, 3, Player::First).unwrap();
        let mut mcts = engine(200);
        let action = mcts.get_action(&board).unwrap();
        let expected = mcts
            .root_children_stats()
            .into_iter()
            .find(|s| s.action == action)
            .unwrap();

        mcts.advance(action);
        board.apply_move(action).unwrap();

        assert_eq!(mcts.root_visits(), expected.visits);
        let root = mcts.tree().get(mcts.tree().root());
        assert!(root.parent().is_none());

        // Search continues from the reused subtree
        let reply = mcts.get_action(&board).unwrap();
        assert!(board.is_available(reply));
        assert_eq!(mcts.root_visits(), expected.visits + 200);
    }

    #[test]
    fn test_advance_into_unknown_action_resets() {
        let board = Board::new(3, 3, 3, Player::First).unwrap();
        let mut mcts = engine(50);
        mcts.get_action(&board).unwrap();

        // 9 is not a move on a 3x3 board, so it cannot be a child
        mcts.advance(9);

        assert_eq!(mcts.root_visits(), 0);
        assert_eq!(mcts.tree().len(), 1);
        assert!((mcts.tree().get(mcts.tree().root()).p() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_stale_tree_is_reported() {
        let mut board = Board::new(3, 3, 3, Player::First).unwrap();
        let mut mcts = engine(1);
        // One playout expands the root; all children tie, so the first wins
        let action = mcts.get_action(&board).unwrap();
        assert_eq!(action, 0);

        // Play it without advancing the engine; selection picks 0 again
        board.apply_move(action).unwrap();
        assert!(matches!(
            mcts.get_action(&board),
            Err(GameError::InvalidMove(_))
        ));
    }
}
