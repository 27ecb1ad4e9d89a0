//! Search tree with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by [`NodeId`]
//! indices. This flattens what would otherwise be a cyclic ownership graph
//! (child -> parent, node -> subgoal ancestor, overlay edges) into plain
//! handles, and lets the whole tree be dropped in one deallocation at the
//! end of a decision.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use search_core::{GameState, PlayerId};

use crate::action::{MacroAction, SearchStep};
use crate::config::{BackupPolicy, MctsConfig};
use crate::node::{NodeId, SearchNode};

/// Search tree with arena-based node storage.
#[derive(Debug)]
pub struct SearchTree<S: GameState> {
    /// Arena storing all nodes.
    nodes: Vec<SearchNode<S>>,

    /// Root node index (always 0 after initialization).
    root: NodeId,
}

/// Outcome of one UCB selection at a fully expanded node.
#[derive(Debug)]
pub struct Selected<S: GameState> {
    /// The chosen child.
    pub child: NodeId,

    /// The edge that was taken, as a recordable descent step.
    pub step: SearchStep<S>,
}

impl<S: GameState> SearchTree<S> {
    /// Create a new tree whose root owns `state`. `actions` are the legal
    /// actions at the root, as enumerated by the forward model.
    pub fn new(state: S, actions: Vec<S::Action>) -> Self {
        Self {
            nodes: vec![SearchNode::new_root(state, actions)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode<S> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<S> {
        &mut self.nodes[id.0 as usize]
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[SearchNode<S>] {
        &self.nodes
    }

    /// Resolve the unexpanded edge `edge_idx` of `parent` to a new child
    /// node owning `state`. Returns the child's ID.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        edge_idx: usize,
        state: S,
        actions: Vec<S::Action>,
    ) -> NodeId {
        let depth = {
            let p = self.get(parent);
            assert!(
                p.edges[edge_idx].child.is_none(),
                "edge already expanded: node {parent:?} edge {edge_idx}"
            );
            p.depth + 1
        };
        let id = NodeId(self.nodes.len() as u32);
        self.nodes
            .push(SearchNode::new_child(parent, depth, state, actions));
        self.get_mut(parent).edges[edge_idx].child = id;
        id
    }

    /// Register `child` as a macro child of the subgoal root `anchor` and
    /// set its subgoal-parent cross-reference.
    ///
    /// The caller is responsible for deduplicating by final state key; a
    /// duplicate registration is an invariant violation.
    pub fn register_macro(&mut self, anchor: NodeId, mac: MacroAction<S>, child: NodeId) {
        assert!(
            !self.get(anchor).contains_macro_target(mac.final_state_key()),
            "macro target registered twice under {anchor:?}"
        );
        self.get_mut(anchor).macro_edges.push((mac, child));
        self.get_mut(child).subgoal_parent = anchor;
    }

    /// Select the best child of a fully expanded node, scoring the atomic
    /// and macro pools with the blended UCB1 rule. First-seen wins ties.
    ///
    /// Panics if any atomic edge is still unexpanded or the node has no
    /// children at all; selection must only run on fully expanded nodes.
    pub fn select_child(
        &self,
        id: NodeId,
        searcher: PlayerId,
        config: &MctsConfig,
        rng: &mut ChaCha20Rng,
    ) -> Selected<S> {
        let node = self.get(id);
        let (atomic_weight, macro_weight) = config.pool_weights(node.visit_count);

        let mut best: Option<Selected<S>> = None;
        let mut best_value = f64::NEG_INFINITY;

        for edge in &node.edges {
            assert!(
                edge.child.is_some(),
                "selection reached an unexpanded child of {id:?}"
            );
            let value = atomic_weight * self.ucb1(node, edge.child, searcher, config, rng);
            if value > best_value {
                best_value = value;
                best = Some(Selected {
                    child: edge.child,
                    step: SearchStep::Atomic(edge.action.clone()),
                });
            }
        }

        for (mac, child) in &node.macro_edges {
            let value = macro_weight * self.ucb1(node, *child, searcher, config, rng);
            if value > best_value {
                best_value = value;
                best = Some(Selected {
                    child: *child,
                    step: SearchStep::Macro(mac.clone()),
                });
            }
        }

        best.unwrap_or_else(|| panic!("selection at {id:?} found no candidate child"))
    }

    /// UCB1 score of `child` as seen from `parent`.
    ///
    /// Opponents are modeled as adversarial toward the searching agent, so
    /// the exploitation term flips sign on their turns. A small
    /// multiplicative noise breaks exact ties without systematic bias.
    fn ucb1(
        &self,
        parent: &SearchNode<S>,
        child: NodeId,
        searcher: PlayerId,
        config: &MctsConfig,
        rng: &mut ChaCha20Rng,
    ) -> f64 {
        let child = self.get(child);
        let visits = f64::from(child.visit_count) + config.epsilon;
        let exploitation = child.total_value / visits;
        let exploration =
            config.exploration * ((f64::from(parent.visit_count) + 1.0).ln() / visits).sqrt();

        let signed = if parent.state.current_player() == searcher {
            exploitation
        } else {
            -exploitation
        };
        noise(signed + exploration, config.epsilon, rng.gen::<f64>())
    }

    /// Propagate a rollout result from `leaf` through ancestry according to
    /// `policy`. Every node visited gains one visit and the full result.
    pub fn backup(&mut self, leaf: NodeId, result: f64, policy: BackupPolicy) {
        match policy {
            BackupPolicy::NaturalParent => {
                let mut current = leaf;
                while current.is_some() {
                    current = self.bump(current, result).0;
                }
            }
            BackupPolicy::SubgoalParent => {
                let mut current = leaf;
                while current.is_some() {
                    let (parent, subgoal_parent) = self.bump(current, result);
                    current = if subgoal_parent.is_some() {
                        subgoal_parent
                    } else {
                        parent
                    };
                }
            }
            BackupPolicy::Both => {
                // Each chain start walks natural parents; subgoal parents
                // found along the way spawn their own chains.
                let mut pending = vec![leaf];
                while let Some(start) = pending.pop() {
                    let mut current = start;
                    while current.is_some() {
                        let (parent, subgoal_parent) = self.bump(current, result);
                        if subgoal_parent.is_some() {
                            pending.push(subgoal_parent);
                        }
                        current = parent;
                    }
                }
            }
        }
    }

    /// Statistics update shared by all backup policies. Returns the node's
    /// (parent, subgoal_parent) pair for the caller to continue the walk.
    fn bump(&mut self, id: NodeId, result: f64) -> (NodeId, NodeId) {
        let node = self.get_mut(id);
        node.visit_count += 1;
        node.total_value += result;
        (node.parent, node.subgoal_parent)
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            macro_edges: self.nodes.iter().map(|n| n.macro_edges.len()).sum(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
        }
    }
}

/// Multiplicative tie-breaking noise: `(v + eps) * (1 + eps * (r - 0.5))`
/// with `r` in `[0, 1)`. Large enough to break exact ties, far too small to
/// reorder distinct scores.
pub(crate) fn noise(value: f64, epsilon: f64, r: f64) -> f64 {
    (value + epsilon) * (1.0 + epsilon * (r - 0.5))
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub macro_edges: usize,
    pub root_visits: u32,
    pub root_value: f64,
    pub max_depth: u32,
}
