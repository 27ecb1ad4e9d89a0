//! Rollout action selection.
//!
//! Rollouts estimate a leaf's value by simulating forward with a cheap
//! policy and scoring the reached state with the configured heuristic. Only
//! the uniform-random policy ships; the trait is the seam for anything
//! smarter.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use search_core::GameState;

/// Picks the next action during a rollout.
pub trait RolloutPolicy<S: GameState> {
    /// Choose one of `actions` for `state`. `actions` is never empty.
    fn choose<'a>(
        &self,
        state: &S,
        actions: &'a [S::Action],
        rng: &mut ChaCha20Rng,
    ) -> &'a S::Action;
}

/// Uniform-random rollout policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandomPolicy;

impl UniformRandomPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl<S: GameState> RolloutPolicy<S> for UniformRandomPolicy {
    fn choose<'a>(
        &self,
        _state: &S,
        actions: &'a [S::Action],
        rng: &mut ChaCha20Rng,
    ) -> &'a S::Action {
        &actions[rng.gen_range(0..actions.len())]
    }
}
