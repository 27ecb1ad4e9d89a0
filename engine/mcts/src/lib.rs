//! Monte Carlo Tree Search with a subgoal-driven macro-action overlay.
//!
//! The search runs the classic four-phase loop (select, expand, rollout,
//! backup) over an arena-backed tree, bounded by a wall-clock, iteration, or
//! forward-model-call budget. When a [`SubgoalDetector`] is wired in, every
//! transition that completes a subgoal additionally registers a macro edge:
//! a compressed multi-step action from the search root directly to the
//! subgoal state. Macro edges compete with atomic edges during
//! selection, feed alternative backup paths, and can drive the final
//! recommendation.
//!
//! The engine is generic over [`GameState`] / [`ForwardModel`] /
//! [`Heuristic`] from `search-core`; it never inspects domain state beyond
//! those traits.
//!
//! ```no_run
//! use mcts::{Budget, MctsConfig, MctsSearch};
//! use games_tictactoe::{TicTacToeModel, TicTacToeState, WinDrawLossHeuristic};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut model = TicTacToeModel;
//! let heuristic = WinDrawLossHeuristic;
//! let config = MctsConfig::default().with_budget(Budget::Iterations(400));
//! let mut search = MctsSearch::new(
//!     &mut model,
//!     &heuristic,
//!     config,
//!     0,
//!     ChaCha20Rng::seed_from_u64(7),
//! )
//! .unwrap();
//!
//! let state = TicTacToeState::new();
//! let legal: Vec<u8> = (0..9).collect();
//! let action = search.get_action(&state, &legal);
//! assert!(legal.contains(&action));
//! ```

mod action;
mod config;
mod node;
mod rollout;
mod search;
mod tree;

pub use action::{MacroAction, SearchStep};
pub use config::{
    BackupPolicy, Budget, ConfigError, MctsConfig, RecommendationPolicy, SubgoalBias,
};
pub use node::{Edge, NodeId, SearchNode};
pub use rollout::{RolloutPolicy, UniformRandomPolicy};
pub use search::{MctsSearch, SearchContext, SearchError};
pub use tree::{Selected, SearchTree, TreeStats};

pub use search_core::{
    state_key, ForwardModel, GameState, Heuristic, PlayerId, SubgoalDetector,
};
