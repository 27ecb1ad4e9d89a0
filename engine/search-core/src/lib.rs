//! Boundary traits between the search engine and its collaborators.
//!
//! The search engine in the `mcts` crate is generic over four seams:
//!
//! - [`GameState`]: a forward-simulatable snapshot of a game in progress
//! - [`ForwardModel`]: advances a state by one action and enumerates the
//!   legal actions of a state
//! - [`Heuristic`]: scores a state from one player's perspective
//! - [`SubgoalDetector`]: optional classifier marking transitions that reach
//!   an "interesting" intermediate state
//!
//! Game rule engines implement these traits in their own crates (see
//! `games-tictactoe` and `games-gridworld`); the engine never depends on a
//! concrete game.

pub mod game;
pub mod heuristic;
pub mod subgoal;

pub use game::{ForwardModel, GameState};
pub use heuristic::Heuristic;
pub use subgoal::SubgoalDetector;

/// Player identity, as reported by [`GameState::current_player`].
pub type PlayerId = usize;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Stable 64-bit key for a state, used to identify macro-action targets.
///
/// Built on the unkeyed default hasher so that the same state produces the
/// same key within and across runs of the same binary.
pub fn state_key<S: Hash>(state: &S) -> u64 {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_key_is_stable() {
        let a = (3u8, [1u8, 2, 3]);
        assert_eq!(state_key(&a), state_key(&a.clone()));
    }

    #[test]
    fn state_key_separates_distinct_states() {
        assert_ne!(state_key(&1u64), state_key(&2u64));
    }
}
