//! Subgoal overlay behavior on the two-room gridworld, where reaching the
//! doorway is the designated subgoal.

use mcts::{
    BackupPolicy, Budget, MctsConfig, MctsSearch, RecommendationPolicy, SubgoalBias,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use games_gridworld::{Dir, DistanceHeuristic, DoorwayDetector, GridState, GridWorldModel};

fn grid_config() -> MctsConfig {
    MctsConfig::default()
        .with_budget(Budget::Iterations(600))
        .with_rollout_length(8)
}

fn run_grid(config: MctsConfig, seed: u64) -> (Dir, mcts::TreeStats) {
    let mut model = GridWorldModel;
    let heuristic = DistanceHeuristic;
    let detector = DoorwayDetector;
    let mut search = MctsSearch::new(
        &mut model,
        &heuristic,
        config,
        0,
        ChaCha20Rng::seed_from_u64(seed),
    )
    .unwrap()
    .with_subgoal_detector(&detector);

    let state = GridState::new();
    let (tree, _) = search.run(&state);
    let action = search.recommend(&tree);
    (action, tree.stats())
}

#[test]
fn door_entries_register_macro_edges() {
    let (_, stats) = run_grid(grid_config(), 21);
    assert!(stats.macro_edges >= 1);
}

#[test]
fn subgoal_recommendation_returns_a_legal_first_step() {
    let config = grid_config().with_recommendation(RecommendationPolicy::Subgoals);
    let (action, stats) = run_grid(config, 22);
    assert!(stats.macro_edges >= 1);
    // The start cell only allows North, South, and East.
    assert!(matches!(action, Dir::North | Dir::South | Dir::East));
}

#[test]
fn subgoal_backup_policies_keep_the_tree_consistent() {
    for policy in [BackupPolicy::SubgoalParent, BackupPolicy::Both] {
        let config = grid_config().with_backup_policy(policy);
        let (action, stats) = run_grid(config, 23);
        assert!(matches!(action, Dir::North | Dir::South | Dir::East));
        assert!(stats.root_visits >= 600);
        assert!(stats.root_value.is_finite());
    }
}

#[test]
fn macro_bias_settings_search_without_incident() {
    for bias in [
        SubgoalBias::Fixed { bias: 0.3 },
        SubgoalBias::Decay { horizon: 200 },
    ] {
        let config = grid_config().with_subgoal_bias(bias);
        let (action, _) = run_grid(config, 24);
        assert!(matches!(action, Dir::North | Dir::South | Dir::East));
    }
}

#[test]
fn subgoal_recommendation_falls_back_without_a_detector() {
    // No detector wired in: the tree has no macro children, so the
    // SUBGOALS policy must degrade to the standard visit-count pick.
    let mut model = GridWorldModel;
    let heuristic = DistanceHeuristic;
    let config = MctsConfig::default()
        .with_budget(Budget::Iterations(200))
        .with_recommendation(RecommendationPolicy::Subgoals);
    let mut search = MctsSearch::new(
        &mut model,
        &heuristic,
        config,
        0,
        ChaCha20Rng::seed_from_u64(25),
    )
    .unwrap();

    let state = GridState::new();
    let (tree, _) = search.run(&state);
    assert_eq!(tree.stats().macro_edges, 0);
    let action = search.recommend(&tree);
    assert!(matches!(action, Dir::North | Dir::South | Dir::East));
}
