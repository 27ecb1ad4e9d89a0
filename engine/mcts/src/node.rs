//! Search tree node representation.
//!
//! Each node owns a private state snapshot reached by applying one action to
//! its parent's snapshot, plus the visit statistics driving UCB selection.
//! Nodes live in the tree's arena and reference each other by [`NodeId`]
//! handles; the subgoal overlay is a second set of handle-indexed edges
//! layered over the same arena.

use search_core::GameState;

use crate::action::MacroAction;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// An atomic edge: one legal action at the node, either still unexpanded
/// (`child == NodeId::NONE`) or resolved to a child node.
#[derive(Debug, Clone)]
pub struct Edge<S: GameState> {
    pub action: S::Action,
    pub child: NodeId,
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct SearchNode<S: GameState> {
    /// Structural parent (NONE for the root).
    pub parent: NodeId,

    /// The subgoal root this node was registered under, set only for macro
    /// children. A non-owning cross-reference; backup policies may follow
    /// it instead of (or in addition to) the structural parent.
    pub subgoal_parent: NodeId,

    /// Distance from the root.
    pub depth: u32,

    /// Privately owned state snapshot.
    pub state: S,

    /// Number of backup passes through this node.
    pub visit_count: u32,

    /// Sum of rollout results backed up through this node.
    pub total_value: f64,

    /// One edge per legal action at `state`, computed once at construction.
    pub edges: Vec<Edge<S>>,

    /// Macro children registered under this node (the subgoal overlay).
    pub macro_edges: Vec<(MacroAction<S>, NodeId)>,
}

impl<S: GameState> SearchNode<S> {
    /// Create the root node. `actions` are the forward model's legal actions
    /// for `state`.
    pub fn new_root(state: S, actions: Vec<S::Action>) -> Self {
        Self::new(NodeId::NONE, 0, state, actions)
    }

    /// Create a child node at `depth`.
    pub fn new_child(parent: NodeId, depth: u32, state: S, actions: Vec<S::Action>) -> Self {
        Self::new(parent, depth, state, actions)
    }

    fn new(parent: NodeId, depth: u32, state: S, actions: Vec<S::Action>) -> Self {
        let edges = actions
            .into_iter()
            .map(|action| Edge {
                action,
                child: NodeId::NONE,
            })
            .collect();
        Self {
            parent,
            subgoal_parent: NodeId::NONE,
            depth,
            state,
            visit_count: 0,
            total_value: 0.0,
            edges,
            macro_edges: Vec::new(),
        }
    }

    /// Mean backed-up value, or 0 if never visited.
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.total_value / f64::from(self.visit_count)
        }
    }

    /// Whether any legal action is still unexpanded.
    pub fn has_unexpanded(&self) -> bool {
        self.edges.iter().any(|edge| edge.child.is_none())
    }

    /// Indices of the unexpanded edges, in action order.
    pub fn unexpanded_indices(&self) -> Vec<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| edge.child.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether `key` already identifies one of this node's macro children.
    pub fn contains_macro_target(&self, key: u64) -> bool {
        self.macro_edges
            .iter()
            .any(|(mac, _)| mac.final_state_key() == key)
    }
}
