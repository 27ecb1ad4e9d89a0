//! Two-room gridworld with a doorway bottleneck.
//!
//! A single agent walks a 7x7 grid split by a wall down column 3 with a
//! single door at (3, 3). The agent starts at (0, 3) against the west edge
//! and must reach the goal at (6, 3) on the east side, so every solution
//! passes through the door. Passing the door is the natural subgoal, which
//! makes this the canonical domain for exercising macro-action search.

use search_core::{ForwardModel, GameState, Heuristic, PlayerId, SubgoalDetector};

pub const WIDTH: i8 = 7;
pub const HEIGHT: i8 = 7;
pub const WALL_COLUMN: i8 = 3;
pub const DOOR: (i8, i8) = (3, 3);
pub const START: (i8, i8) = (0, 3);
pub const GOAL: (i8, i8) = (6, 3);

/// A compass move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    North,
    South,
    East,
    West,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::North, Dir::South, Dir::East, Dir::West];

    fn delta(self) -> (i8, i8) {
        match self {
            Dir::North => (0, -1),
            Dir::South => (0, 1),
            Dir::East => (1, 0),
            Dir::West => (-1, 0),
        }
    }
}

/// Agent position plus an elapsed-step counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridState {
    x: i8,
    y: i8,
    steps: u32,
}

impl GridState {
    /// State at the start position.
    pub fn new() -> Self {
        Self {
            x: START.0,
            y: START.1,
            steps: 0,
        }
    }

    pub fn position(&self) -> (i8, i8) {
        (self.x, self.y)
    }

    /// Whether `(x, y)` is on the grid and not inside the dividing wall.
    pub fn is_open(x: i8, y: i8) -> bool {
        if x < 0 || y < 0 || x >= WIDTH || y >= HEIGHT {
            return false;
        }
        x != WALL_COLUMN || (x, y) == DOOR
    }

    /// Destination of `dir` from this state, or `None` if blocked.
    pub fn destination(&self, dir: Dir) -> Option<(i8, i8)> {
        let (dx, dy) = dir.delta();
        let (nx, ny) = (self.x + dx, self.y + dy);
        Self::is_open(nx, ny).then_some((nx, ny))
    }
}

impl Default for GridState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for GridState {
    type Action = Dir;

    fn is_terminal(&self) -> bool {
        (self.x, self.y) == GOAL
    }

    fn current_player(&self) -> PlayerId {
        0
    }

    fn turn(&self) -> u32 {
        self.steps
    }
}

/// Deterministic gridworld forward model. Only unblocked moves are offered,
/// so `next` never has to reject an action.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridWorldModel;

impl ForwardModel<GridState> for GridWorldModel {
    fn next(&mut self, state: &mut GridState, action: &Dir) {
        if let Some((nx, ny)) = state.destination(*action) {
            state.x = nx;
            state.y = ny;
        }
        state.steps += 1;
    }

    fn compute_available_actions(&self, state: &GridState) -> Vec<Dir> {
        Dir::ALL
            .iter()
            .copied()
            .filter(|&dir| state.destination(dir).is_some())
            .collect()
    }
}

/// Distance-to-goal evaluation, routed through the door. Always finite, and
/// strictly higher the closer the agent is to the goal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceHeuristic;

impl DistanceHeuristic {
    fn walking_distance(x: i8, y: i8) -> i32 {
        let manhattan =
            |(ax, ay): (i8, i8), (bx, by): (i8, i8)| i32::from((ax - bx).abs() + (ay - by).abs());

        if x > WALL_COLUMN {
            manhattan((x, y), GOAL)
        } else {
            // West of the wall (or in the doorway): go via the door.
            manhattan((x, y), DOOR) + manhattan(DOOR, GOAL)
        }
    }
}

impl Heuristic<GridState> for DistanceHeuristic {
    fn evaluate_state(&self, state: &GridState, _player: PlayerId) -> f64 {
        1.0 / (1.0 + f64::from(Self::walking_distance(state.x, state.y)))
    }
}

/// Flags any move that steps into the doorway cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoorwayDetector;

impl SubgoalDetector<GridState> for DoorwayDetector {
    fn is_subgoal(&self, previous: &GridState, action: &Dir) -> bool {
        previous.destination(*action) == Some(DOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_state_is_not_terminal() {
        let state = GridState::new();
        assert_eq!(state.position(), START);
        assert!(!state.is_terminal());
        assert_eq!(state.turn(), 0);
    }

    #[test]
    fn wall_blocks_everything_but_the_door() {
        for y in 0..HEIGHT {
            let open = GridState::is_open(WALL_COLUMN, y);
            assert_eq!(open, y == DOOR.1);
        }
        assert!(!GridState::is_open(-1, 3));
        assert!(!GridState::is_open(3, HEIGHT));
    }

    #[test]
    fn available_actions_exclude_blocked_moves() {
        let mut model = GridWorldModel;

        // Start cell: west is off-grid, east is the wall row y=3... east of
        // (0,3) is (1,3) which is open.
        let state = GridState::new();
        let actions = model.compute_available_actions(&state);
        assert!(actions.contains(&Dir::East));
        assert!(!actions.contains(&Dir::West));

        // Cell just west of the wall at a non-door row.
        let mut state = GridState::new();
        state.x = 2;
        state.y = 5;
        let actions = model.compute_available_actions(&state);
        assert!(!actions.contains(&Dir::East));
    }

    #[test]
    fn model_steps_and_counts() {
        let mut model = GridWorldModel;
        let mut state = GridState::new();
        model.next(&mut state, &Dir::East);
        assert_eq!(state.position(), (1, 3));
        assert_eq!(state.turn(), 1);
    }

    #[test]
    fn goal_is_terminal() {
        let mut state = GridState::new();
        state.x = GOAL.0;
        state.y = GOAL.1;
        assert!(state.is_terminal());
    }

    #[test]
    fn heuristic_increases_toward_the_goal() {
        let heuristic = DistanceHeuristic;
        let at = |x, y| {
            let mut s = GridState::new();
            s.x = x;
            s.y = y;
            heuristic.evaluate_state(&s, 0)
        };

        // Walking east along the corridor strictly improves the value.
        assert!(at(1, 3) > at(0, 3));
        assert!(at(3, 3) > at(1, 3));
        assert!(at(5, 3) > at(3, 3));
        assert_eq!(at(GOAL.0, GOAL.1), 1.0);

        // A cell hugging the wall on the west side is still scored via the
        // door, so it is worse than standing in the doorway.
        assert!(at(2, 0) < at(3, 3));
    }

    #[test]
    fn doorway_detector_fires_only_on_door_entry() {
        let detector = DoorwayDetector;

        let mut before_door = GridState::new();
        before_door.x = 2;
        before_door.y = 3;
        assert!(detector.is_subgoal(&before_door, &Dir::East));
        assert!(!detector.is_subgoal(&before_door, &Dir::North));

        let start = GridState::new();
        assert!(!detector.is_subgoal(&start, &Dir::East));
    }
}
