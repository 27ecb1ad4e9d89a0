//! Subgoal classification.

use crate::GameState;

/// Classifies a transition as reaching a subgoal.
///
/// Wiring a detector into the search enables the macro-action overlay; when
/// no detector is present the overlay is disabled entirely.
pub trait SubgoalDetector<S: GameState> {
    /// Whether applying `action` to `previous` reaches a subgoal state.
    fn is_subgoal(&self, previous: &S, action: &S::Action) -> bool;
}
