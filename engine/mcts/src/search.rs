//! Search driver.
//!
//! Runs the bounded select -> expand -> rollout -> backup loop against a
//! forward model and issues the final recommendation. One driver serves one
//! searching player; each `get_action` call builds a fresh tree and discards
//! it on return.

use std::time::{Duration, Instant};

use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use rand::Rng;
use search_core::{state_key, ForwardModel, GameState, Heuristic, PlayerId, SubgoalDetector};

use crate::action::{MacroAction, SearchStep};
use crate::config::{Budget, ConfigError, MctsConfig, RecommendationPolicy};
use crate::node::NodeId;
use crate::rollout::{RolloutPolicy, UniformRandomPolicy};
use crate::tree::{noise, SearchTree};

/// Errors surfaced at driver construction.
///
/// Mid-search failures are invariant violations and panic instead; a search
/// that has started cannot fail recoverably.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Per-call bookkeeping threaded through the search.
///
/// The forward-model call counter lives here rather than in any node, so the
/// FM_CALLS budget is an explicit, independently testable dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchContext {
    /// Completed select/expand/rollout/backup iterations.
    pub iterations: u32,

    /// Forward-model invocations across the whole tree, expansion and
    /// rollout steps alike.
    pub fm_calls: u32,
}

/// MCTS driver for one searching player.
pub struct MctsSearch<'a, S, F, H>
where
    S: GameState,
    F: ForwardModel<S>,
    H: Heuristic<S>,
{
    model: &'a mut F,
    heuristic: &'a H,
    detector: Option<&'a dyn SubgoalDetector<S>>,
    rollout_policy: Box<dyn RolloutPolicy<S> + 'a>,
    config: MctsConfig,
    player: PlayerId,
    rng: ChaCha20Rng,
}

impl<'a, S, F, H> MctsSearch<'a, S, F, H>
where
    S: GameState,
    F: ForwardModel<S>,
    H: Heuristic<S>,
{
    /// Create a driver for `player`. Fails fast on malformed configuration.
    ///
    /// The RNG is injected here (never seeded from the clock) so that a
    /// fixed seed plus a deterministic forward model reproduces the search
    /// exactly.
    pub fn new(
        model: &'a mut F,
        heuristic: &'a H,
        config: MctsConfig,
        player: PlayerId,
        rng: ChaCha20Rng,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            model,
            heuristic,
            detector: None,
            rollout_policy: Box::new(UniformRandomPolicy::new()),
            config,
            player,
            rng,
        })
    }

    /// Wire in a subgoal detector, enabling the macro-action overlay.
    pub fn with_subgoal_detector(mut self, detector: &'a dyn SubgoalDetector<S>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Replace the uniform-random rollout policy.
    pub fn with_rollout_policy(mut self, policy: Box<dyn RolloutPolicy<S> + 'a>) -> Self {
        self.rollout_policy = policy;
        self
    }

    /// Decide one action for `state`.
    ///
    /// When `possible_actions` has exactly one element it is returned
    /// immediately with zero search. The returned action is always one of
    /// `possible_actions`.
    pub fn get_action(&mut self, state: &S, possible_actions: &[S::Action]) -> S::Action {
        assert!(
            !possible_actions.is_empty(),
            "get_action called with no legal action"
        );
        if possible_actions.len() == 1 {
            debug!("single legal action, skipping search");
            return possible_actions[0].clone();
        }

        let (tree, ctx) = self.run(state);
        let action = self.recommend(&tree);
        debug!(
            iterations = ctx.iterations,
            fm_calls = ctx.fm_calls,
            nodes = tree.len(),
            ?action,
            "search complete"
        );
        assert!(
            possible_actions.contains(&action),
            "recommended action {action:?} is not among the caller's possible actions"
        );
        action
    }

    /// Run the bounded search loop from `state` and return the finished
    /// tree together with its bookkeeping.
    pub fn run(&mut self, state: &S) -> (SearchTree<S>, SearchContext) {
        let actions = self.model.compute_available_actions(state);
        let mut tree = SearchTree::new(state.clone(), actions);
        let mut ctx = SearchContext::default();

        let started = Instant::now();
        let mut accumulated = Duration::ZERO;

        loop {
            let iteration_started = Instant::now();
            let fm_before = ctx.fm_calls;

            let selected = self.tree_policy(&mut tree, &mut ctx);
            let result = self.rollout(&tree, selected, &mut ctx);
            tree.backup(selected, result, self.config.backup_policy);

            ctx.iterations += 1;
            trace!(
                iteration = ctx.iterations,
                leaf = selected.0,
                result,
                "iteration complete"
            );

            let stop = match self.config.budget {
                Budget::Iterations(limit) => ctx.iterations >= limit,
                Budget::FmCalls(limit) => {
                    // Terminal-leaf iterations touch no new state; charge
                    // them one unit so a saturated tree cannot spin on this
                    // budget.
                    if ctx.fm_calls == fm_before {
                        ctx.fm_calls += 1;
                    }
                    ctx.fm_calls >= limit
                }
                Budget::Time(limit) => {
                    accumulated += iteration_started.elapsed();
                    let average = accumulated / ctx.iterations;
                    let remaining = limit.saturating_sub(started.elapsed());
                    remaining <= average * 2 || remaining <= self.config.break_margin
                }
            };
            if stop {
                break;
            }
        }

        (tree, ctx)
    }

    /// Selection + expansion: descend from the root until a node with an
    /// unexpanded action is found and expand it, or stop at a terminal or
    /// depth-capped node.
    ///
    /// Exactly one node is added per call unless descent hits a cutoff. The
    /// whole descent path is recorded, with a traversed macro edge entering
    /// the record as a single macro step, so a macro created at the end of
    /// this path may contain earlier macros as constituents.
    fn tree_policy(&mut self, tree: &mut SearchTree<S>, ctx: &mut SearchContext) -> NodeId {
        let mut current = tree.root();
        let mut steps: Vec<SearchStep<S>> = Vec::new();
        let mut visited: Vec<NodeId> = Vec::new();

        loop {
            {
                let node = tree.get(current);
                if node.state.is_terminal() || node.depth >= self.config.max_tree_depth {
                    return current;
                }
                if node.has_unexpanded() {
                    return self.expand(tree, current, steps, visited, ctx);
                }
            }

            let selected = tree.select_child(current, self.player, &self.config, &mut self.rng);
            steps.push(selected.step);
            visited.push(current);
            current = selected.child;
        }
    }

    /// Expand one uniformly chosen unexpanded action of `parent`, and
    /// register a macro edge when the transition reaches a fresh subgoal.
    fn expand(
        &mut self,
        tree: &mut SearchTree<S>,
        parent: NodeId,
        mut steps: Vec<SearchStep<S>>,
        visited: Vec<NodeId>,
        ctx: &mut SearchContext,
    ) -> NodeId {
        let (edge_idx, action, mut next_state) = {
            let node = tree.get(parent);
            let unexpanded = node.unexpanded_indices();
            let edge_idx = unexpanded[self.rng.gen_range(0..unexpanded.len())];
            (
                edge_idx,
                node.edges[edge_idx].action.clone(),
                node.state.clone(),
            )
        };

        self.model.next(&mut next_state, &action);
        ctx.fm_calls += 1;

        let child_actions = self.model.compute_available_actions(&next_state);
        let child = tree.add_child(parent, edge_idx, next_state, child_actions);

        if let Some(detector) = self.detector {
            let parent_node = tree.get(parent);
            // Macro actions are only tracked for the searching player's own
            // transitions; opponent subgoals are out of scope.
            if parent_node.state.current_player() == self.player
                && detector.is_subgoal(&parent_node.state, &action)
            {
                let key = state_key(&tree.get(child).state);
                let anchor = tree.root();
                if !tree.get(anchor).contains_macro_target(key) {
                    steps.push(SearchStep::Atomic(action));
                    let mut states: Vec<S> = visited
                        .iter()
                        .map(|&id| tree.get(id).state.clone())
                        .collect();
                    states.push(tree.get(parent).state.clone());

                    let mac = MacroAction::new(self.player, steps, states, key);
                    trace!(
                        anchor = anchor.0,
                        child = child.0,
                        len = mac.len(),
                        "registered macro edge"
                    );
                    tree.register_macro(anchor, mac, child);
                }
            }
        }

        child
    }

    /// Simulate from `leaf` with the rollout policy and score the reached
    /// state with the heuristic.
    fn rollout(&mut self, tree: &SearchTree<S>, leaf: NodeId, ctx: &mut SearchContext) -> f64 {
        let mut state = tree.get(leaf).state.clone();

        if self.config.rollout_length > 0 {
            let mut depth = 0;
            while depth < self.config.rollout_length && !state.is_terminal() {
                let actions = self.model.compute_available_actions(&state);
                assert!(
                    !actions.is_empty(),
                    "forward model returned no action for a non-terminal state"
                );
                let action = self
                    .rollout_policy
                    .choose(&state, &actions, &mut self.rng)
                    .clone();
                self.model.next(&mut state, &action);
                ctx.fm_calls += 1;
                depth += 1;
            }
        }

        let value = self.heuristic.evaluate_state(&state, self.player);
        assert!(
            value.is_finite(),
            "heuristic returned a non-finite value: {value}"
        );
        value
    }

    /// Pick the final action from a finished tree.
    pub fn recommend(&mut self, tree: &SearchTree<S>) -> S::Action {
        match self.config.recommendation {
            RecommendationPolicy::Standard => self.recommend_standard(tree),
            RecommendationPolicy::Subgoals => {
                let root = tree.get(tree.root());
                if root.macro_edges.is_empty() {
                    // Documented fallback: without any detected subgoal the
                    // visit-count recommendation over atomic children applies.
                    debug!("no macro children at root, falling back to standard recommendation");
                    self.recommend_standard(tree)
                } else {
                    self.recommend_subgoals(tree)
                }
            }
        }
    }

    /// Most-visited expanded atomic child of the root, noise-broken ties.
    fn recommend_standard(&mut self, tree: &SearchTree<S>) -> S::Action {
        let root = tree.get(tree.root());
        let mut best: Option<&S::Action> = None;
        let mut best_value = f64::NEG_INFINITY;

        for edge in &root.edges {
            // Entries still unexpanded were never visited and must not win.
            if edge.child.is_none() {
                continue;
            }
            let visits = f64::from(tree.get(edge.child).visit_count);
            let value = noise(visits, self.config.epsilon, self.rng.gen::<f64>());
            if value > best_value {
                best_value = value;
                best = Some(&edge.action);
            }
        }

        best.expect("no expanded child to recommend").clone()
    }

    /// Most-visited macro child of the root, unwound to its first atomic
    /// constituent.
    fn recommend_subgoals(&mut self, tree: &SearchTree<S>) -> S::Action {
        let root = tree.get(tree.root());
        let mut best: Option<&MacroAction<S>> = None;
        let mut best_value = f64::NEG_INFINITY;

        for (mac, child) in &root.macro_edges {
            let visits = f64::from(tree.get(*child).visit_count);
            let value = noise(visits, self.config.epsilon, self.rng.gen::<f64>());
            if value > best_value {
                best_value = value;
                best = Some(mac);
            }
        }

        best.expect("no macro child to recommend")
            .first_atomic()
            .clone()
    }
}
