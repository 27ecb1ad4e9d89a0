//! Search configuration parameters.
//!
//! Malformed configuration is rejected at construction via
//! [`MctsConfig::validate`]; the search loop itself never re-checks these
//! values.

use std::time::Duration;

use thiserror::Error;

/// Resource limit bounding one search invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Budget {
    /// Elapsed wall time. The loop stops early once the remaining time drops
    /// below twice the running average iteration duration, or below the
    /// configured break margin, so an iteration never overruns the limit.
    Time(Duration),

    /// Fixed number of select/expand/rollout/backup iterations.
    Iterations(u32),

    /// Fixed number of forward-model invocations, counted across the whole
    /// tree (expansion steps and rollout steps alike).
    FmCalls(u32),
}

/// How a rollout result is propagated through ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupPolicy {
    /// Follow only the structural tree parent chain.
    NaturalParent,

    /// Follow the subgoal-parent cross-reference where present, falling back
    /// to the structural parent elsewhere.
    SubgoalParent,

    /// Credit both chains: continue along the structural parent chain and
    /// additionally back up through every subgoal parent encountered.
    Both,
}

/// How the final action is picked once the budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationPolicy {
    /// Root's atomic child with the highest visit count.
    Standard,

    /// Root's macro child with the highest visit count, unwound to its first
    /// constituent atomic action. Falls back to [`Standard`] when no macro
    /// child exists.
    ///
    /// [`Standard`]: RecommendationPolicy::Standard
    Subgoals,
}

/// Weighting between the atomic-child pool and the macro-child pool during
/// selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubgoalBias {
    /// Both pools compete at full weight.
    None,

    /// The macro pool is weighted `bias`, the atomic pool `1 - bias`.
    Fixed { bias: f64 },

    /// The atomic pool's weight decays linearly from 1 to 0 as the node's
    /// visit count approaches `horizon`; the macro pool receives the
    /// complement.
    Decay { horizon: u32 },
}

/// Configuration for one search driver.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Active budget for each `get_action` call.
    pub budget: Budget,

    /// Exploration constant `K` in the UCB1 term.
    pub exploration: f64,

    /// Small positive constant guarding divisions by zero-visit counts and
    /// scaling the multiplicative tie-breaking noise.
    pub epsilon: f64,

    /// Maximum random-simulation depth below a freshly expanded node.
    /// Zero disables rollouts: the heuristic scores the node's state
    /// directly.
    pub rollout_length: u32,

    /// Maximum tree depth; selection stops descending at this depth.
    pub max_tree_depth: u32,

    /// Backup strategy for rollout results.
    pub backup_policy: BackupPolicy,

    /// Final recommendation strategy.
    pub recommendation: RecommendationPolicy,

    /// Atomic/macro pool weighting during selection.
    pub subgoal_bias: SubgoalBias,

    /// Safety margin for the TIME budget's early stop.
    pub break_margin: Duration,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            budget: Budget::Iterations(400),
            exploration: std::f64::consts::SQRT_2,
            epsilon: 1e-6,
            rollout_length: 10,
            max_tree_depth: 64,
            backup_policy: BackupPolicy::NaturalParent,
            recommendation: RecommendationPolicy::Standard,
            subgoal_bias: SubgoalBias::None,
            break_margin: Duration::from_millis(5),
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("budget must be positive")]
    NonPositiveBudget,

    #[error("exploration constant must be finite and non-negative, got {0}")]
    InvalidExploration(f64),

    #[error("epsilon must be a small positive number, got {0}")]
    InvalidEpsilon(f64),

    #[error("maximum tree depth must be at least 1")]
    ZeroTreeDepth,

    #[error("subgoal bias must lie in [0, 1], got {0}")]
    BiasOutOfRange(f64),

    #[error("bias decay horizon must be at least 1")]
    ZeroDecayHorizon,
}

impl MctsConfig {
    /// Fast config for tests.
    pub fn for_testing() -> Self {
        Self {
            budget: Budget::Iterations(50),
            rollout_length: 6,
            ..Self::default()
        }
    }

    /// Builder pattern: set the budget.
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, k: f64) -> Self {
        self.exploration = k;
        self
    }

    /// Builder pattern: set the rollout length.
    pub fn with_rollout_length(mut self, length: u32) -> Self {
        self.rollout_length = length;
        self
    }

    /// Builder pattern: set the maximum tree depth.
    pub fn with_max_tree_depth(mut self, depth: u32) -> Self {
        self.max_tree_depth = depth;
        self
    }

    /// Builder pattern: set the backup policy.
    pub fn with_backup_policy(mut self, policy: BackupPolicy) -> Self {
        self.backup_policy = policy;
        self
    }

    /// Builder pattern: set the recommendation policy.
    pub fn with_recommendation(mut self, policy: RecommendationPolicy) -> Self {
        self.recommendation = policy;
        self
    }

    /// Builder pattern: set the atomic/macro selection bias.
    pub fn with_subgoal_bias(mut self, bias: SubgoalBias) -> Self {
        self.subgoal_bias = bias;
        self
    }

    /// Validate all parameters, failing fast before any search runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.budget {
            Budget::Iterations(0) | Budget::FmCalls(0) => {
                return Err(ConfigError::NonPositiveBudget)
            }
            Budget::Time(t) if t.is_zero() => return Err(ConfigError::NonPositiveBudget),
            _ => {}
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        if self.max_tree_depth == 0 {
            return Err(ConfigError::ZeroTreeDepth);
        }
        match self.subgoal_bias {
            SubgoalBias::Fixed { bias } if !(0.0..=1.0).contains(&bias) => {
                return Err(ConfigError::BiasOutOfRange(bias))
            }
            SubgoalBias::Decay { horizon: 0 } => return Err(ConfigError::ZeroDecayHorizon),
            _ => {}
        }
        Ok(())
    }

    /// Atomic and macro pool weights for a node with `visits` visits.
    pub(crate) fn pool_weights(&self, visits: u32) -> (f64, f64) {
        match self.subgoal_bias {
            SubgoalBias::None => (1.0, 1.0),
            SubgoalBias::Fixed { bias } => (1.0 - bias, bias),
            SubgoalBias::Decay { horizon } => {
                let h = f64::from(horizon);
                let atomic = ((h - f64::from(visits)) / h).max(0.0);
                (atomic, 1.0 - atomic)
            }
        }
    }
}
