//! State evaluation heuristics.

use crate::{GameState, PlayerId};

/// Scores a state from one player's perspective. Higher is better.
///
/// Implementations must return a finite value for every reachable state; the
/// engine treats a NaN or infinite score as a fatal programming error rather
/// than a recoverable condition.
pub trait Heuristic<S: GameState> {
    fn evaluate_state(&self, state: &S, player: PlayerId) -> f64;
}
