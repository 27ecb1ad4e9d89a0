//! Macro actions: compressed multi-step edges in the subgoal overlay.

use search_core::{GameState, PlayerId};

/// One constituent step of a macro action.
///
/// During descent the chosen edge at each node is either a single atomic
/// action or a previously registered macro action, so a macro recorded from
/// that path may itself contain nested macros.
#[derive(Debug, Clone)]
pub enum SearchStep<S: GameState> {
    Atomic(S::Action),
    Macro(MacroAction<S>),
}

impl<S: GameState> SearchStep<S> {
    /// The first atomic action reached by unwinding nested macros.
    pub fn first_atomic(&self) -> &S::Action {
        match self {
            SearchStep::Atomic(action) => action,
            SearchStep::Macro(mac) => mac.first_atomic(),
        }
    }
}

/// A compressed edge from a subgoal root directly to a detected subgoal
/// state, bypassing the intermediate tree nodes.
///
/// Identified by a stable hash of the final resulting state; a given target
/// state is registered under a subgoal root at most once.
#[derive(Debug, Clone)]
pub struct MacroAction<S: GameState> {
    /// Player who completed the subgoal transition.
    pub player: PlayerId,

    /// The step sequence from the subgoal root to the target, in order.
    steps: Vec<SearchStep<S>>,

    /// The states traversed alongside `steps` (one per step, the state each
    /// step was taken from).
    states: Vec<S>,

    /// Identity of the resulting state.
    final_state_key: u64,
}

impl<S: GameState> MacroAction<S> {
    /// Build a macro action from a recorded descent path.
    ///
    /// Panics if the path is empty or the step and state sequences disagree
    /// in length; both indicate a corrupted descent record.
    pub fn new(
        player: PlayerId,
        steps: Vec<SearchStep<S>>,
        states: Vec<S>,
        final_state_key: u64,
    ) -> Self {
        assert!(!steps.is_empty(), "macro action with empty step sequence");
        assert_eq!(
            steps.len(),
            states.len(),
            "macro action step/state sequences out of sync"
        );
        Self {
            player,
            steps,
            states,
            final_state_key,
        }
    }

    /// The first atomic action of the sequence, unwinding nested macros.
    pub fn first_atomic(&self) -> &S::Action {
        self.steps[0].first_atomic()
    }

    /// Identity of the state this macro action leads to.
    pub fn final_state_key(&self) -> u64 {
        self.final_state_key
    }

    /// Number of constituent steps (macros count as one step).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        false // construction rejects empty sequences
    }

    /// Constituent steps in order.
    pub fn steps(&self) -> &[SearchStep<S>] {
        &self.steps
    }

    /// States traversed alongside the steps.
    pub fn states(&self) -> &[S] {
        &self.states
    }
}
