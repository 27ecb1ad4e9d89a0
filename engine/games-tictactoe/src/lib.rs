//! TicTacToe bindings for the search engine.
//!
//! A complete reference implementation of the `search-core` traits: state,
//! forward model, and heuristic. Mainly exercised by the engine's tests and
//! benchmarks.

use search_core::{ForwardModel, GameState, Heuristic, PlayerId};

/// TicTacToe game state.
///
/// Cells hold 0 for empty, 1 for X, 2 for O. Player ids map X to 0 and O
/// to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicTacToeState {
    /// Board representation: 0=empty, 1=X, 2=O.
    board: [u8; 9],
    /// Side to move: 1=X, 2=O.
    current_player: u8,
    /// Winner: 0=none/ongoing, 1=X, 2=O, 3=draw.
    winner: u8,
}

impl TicTacToeState {
    /// Create a new initial game state.
    pub fn new() -> Self {
        Self {
            board: [0; 9],
            current_player: 1, // X goes first
            winner: 0,
        }
    }

    /// Whether the game is over.
    pub fn is_done(&self) -> bool {
        self.winner != 0
    }

    /// Winner cell value: 0=ongoing, 1=X, 2=O, 3=draw.
    pub fn winner(&self) -> u8 {
        self.winner
    }

    /// Legal moves (empty positions), none once the game is over.
    pub fn legal_moves(&self) -> Vec<u8> {
        if self.is_done() {
            return Vec::new();
        }

        (0..9u8)
            .filter(|&pos| self.board[pos as usize] == 0)
            .collect()
    }

    /// Apply a move and return the new state. Invalid moves leave the state
    /// unchanged.
    pub fn make_move(&self, position: u8) -> TicTacToeState {
        if self.is_done() || position >= 9 || self.board[position as usize] != 0 {
            return *self;
        }

        let mut new_state = *self;
        new_state.board[position as usize] = self.current_player;
        new_state.winner = Self::check_winner(&new_state.board);

        if new_state.winner == 0 {
            new_state.current_player = if self.current_player == 1 { 2 } else { 1 };
        }

        new_state
    }

    fn check_winner(board: &[u8; 9]) -> u8 {
        // Winning positions (rows, columns, diagonals)
        const LINES: [[usize; 3]; 8] = [
            [0, 1, 2],
            [3, 4, 5],
            [6, 7, 8],
            [0, 3, 6],
            [1, 4, 7],
            [2, 5, 8],
            [0, 4, 8],
            [2, 4, 6],
        ];

        for line in &LINES {
            let [a, b, c] = *line;
            if board[a] != 0 && board[a] == board[b] && board[b] == board[c] {
                return board[a];
            }
        }

        if board.iter().all(|&cell| cell != 0) {
            return 3; // Draw
        }

        0
    }
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for TicTacToeState {
    type Action = u8;

    fn is_terminal(&self) -> bool {
        self.is_done()
    }

    fn current_player(&self) -> PlayerId {
        PlayerId::from(self.current_player - 1)
    }

    fn turn(&self) -> u32 {
        self.board.iter().filter(|&&cell| cell != 0).count() as u32
    }
}

/// Deterministic TicTacToe forward model.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToeModel;

impl ForwardModel<TicTacToeState> for TicTacToeModel {
    fn next(&mut self, state: &mut TicTacToeState, action: &u8) {
        *state = state.make_move(*action);
    }

    fn compute_available_actions(&self, state: &TicTacToeState) -> Vec<u8> {
        state.legal_moves()
    }
}

/// Win/draw/loss evaluation: 1.0 for a won state, 0.0 for a lost one, 0.5
/// for a draw or an undecided position.
#[derive(Debug, Clone, Copy, Default)]
pub struct WinDrawLossHeuristic;

impl Heuristic<TicTacToeState> for WinDrawLossHeuristic {
    fn evaluate_state(&self, state: &TicTacToeState, player: PlayerId) -> f64 {
        match state.winner {
            0 | 3 => 0.5,
            winner => {
                if PlayerId::from(winner - 1) == player {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let state = TicTacToeState::new();
        assert_eq!(state.board, [0; 9]);
        assert_eq!(state.current_player(), 0);
        assert_eq!(state.turn(), 0);
        assert!(!state.is_terminal());
    }

    #[test]
    fn legal_moves_shrink_as_moves_are_made() {
        let state = TicTacToeState::new();
        assert_eq!(state.legal_moves(), (0..9).collect::<Vec<_>>());

        let state = state.make_move(4);
        let legal = state.legal_moves();
        assert_eq!(legal.len(), 8);
        assert!(!legal.contains(&4));
    }

    #[test]
    fn make_move_switches_player() {
        let state = TicTacToeState::new().make_move(4);
        assert_eq!(state.board[4], 1);
        assert_eq!(state.current_player(), 1);
        assert_eq!(state.turn(), 1);
    }

    #[test]
    fn invalid_move_leaves_state_unchanged() {
        let state = TicTacToeState::new().make_move(4);
        assert_eq!(state.make_move(4), state);
        assert_eq!(state.make_move(42), state);
    }

    #[test]
    fn top_row_win_ends_the_game() {
        let mut state = TicTacToeState::new();
        for pos in [0, 3, 1, 4, 2] {
            state = state.make_move(pos);
        }

        assert_eq!(state.winner(), 1);
        assert!(state.is_terminal());
        assert!(state.legal_moves().is_empty());
    }

    #[test]
    fn all_winning_lines_are_detected() {
        let lines: [[usize; 3]; 8] = [
            [0, 1, 2],
            [3, 4, 5],
            [6, 7, 8],
            [0, 3, 6],
            [1, 4, 7],
            [2, 5, 8],
            [0, 4, 8],
            [2, 4, 6],
        ];

        for line in &lines {
            for piece in [1u8, 2u8] {
                let mut board = [0u8; 9];
                for &pos in line {
                    board[pos] = piece;
                }
                assert_eq!(TicTacToeState::check_winner(&board), piece);
            }
        }
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        // X O X / X O O / O X X
        let board = [1, 2, 1, 1, 2, 2, 2, 1, 1];
        assert_eq!(TicTacToeState::check_winner(&board), 3);
    }

    #[test]
    fn model_applies_moves_in_place() {
        let mut model = TicTacToeModel;
        let mut state = TicTacToeState::new();
        model.next(&mut state, &4);
        assert_eq!(state.board[4], 1);
        assert_eq!(model.compute_available_actions(&state).len(), 8);
    }

    #[test]
    fn heuristic_scores_from_the_asking_players_view() {
        let heuristic = WinDrawLossHeuristic;

        let mut state = TicTacToeState::new();
        assert_eq!(heuristic.evaluate_state(&state, 0), 0.5);
        assert_eq!(heuristic.evaluate_state(&state, 1), 0.5);

        for pos in [0, 3, 1, 4, 2] {
            state = state.make_move(pos);
        }
        assert_eq!(heuristic.evaluate_state(&state, 0), 1.0);
        assert_eq!(heuristic.evaluate_state(&state, 1), 0.0);
    }

    #[test]
    fn states_hash_consistently_with_equality() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |state: &TicTacToeState| {
            let mut hasher = DefaultHasher::new();
            state.hash(&mut hasher);
            hasher.finish()
        };

        let a = TicTacToeState::new().make_move(0).make_move(4);
        let b = TicTacToeState::new().make_move(0).make_move(4);
        assert_eq!(a, b);
        assert_eq!(hash(&a), hash(&b));
    }
}
