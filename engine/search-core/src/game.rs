//! Game state and forward model traits.

use std::fmt::Debug;
use std::hash::Hash;

use crate::PlayerId;

/// A snapshot of a game in progress.
///
/// `Clone` must produce an independent deep copy: the search mutates copies
/// privately and never shares state between branches. `Hash` provides the
/// identity used to deduplicate macro-action targets (see
/// [`crate::state_key`]).
pub trait GameState: Clone + Hash + Debug {
    /// An indivisible move as enumerated by the forward model.
    type Action: Clone + PartialEq + Debug;

    /// Whether the game has ended in this state.
    fn is_terminal(&self) -> bool;

    /// The player who acts next in this state.
    fn current_player(&self) -> PlayerId;

    /// Monotonic turn counter, starting at 0 for the initial state.
    fn turn(&self) -> u32;
}

/// Advances game states and enumerates legal actions.
///
/// `next` mutates the state in place and must be deterministic given the
/// model's own internal randomness; callers are expected to pass a private
/// copy of the state they wish to advance.
pub trait ForwardModel<S: GameState> {
    /// Apply `action` to `state` in place.
    fn next(&mut self, state: &mut S, action: &S::Action);

    /// The ordered list of legal actions for the state's current actor.
    ///
    /// Terminal states return an empty list. A non-terminal state must
    /// return at least one action; the engine treats a violation as a fatal
    /// contract error.
    fn compute_available_actions(&self, state: &S) -> Vec<S::Action>;
}
