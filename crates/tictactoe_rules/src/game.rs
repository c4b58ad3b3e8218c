//! Turn state machine for tic-tac-toe.
//!
//! [`GameState`] is the single place where moves are checked and applied.
//! Every rejected call leaves the state exactly as it was.

use crate::rules::{check_winner, is_full};
use crate::{Board, Cell, Move, Outcome, Phase, Player};
use tracing::{debug, instrument};

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The target lies outside the 3x3 board.
    #[display("Position ({}, {}) is off the board", row, col)]
    OutOfBounds {
        /// Requested row.
        row: i64,
        /// Requested column.
        col: i64,
    },

    /// The cell at the position is already occupied.
    #[display("Cell {} is already occupied by {}", _0, _1)]
    CellOccupied(Move, Player),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// It's not this player's turn.
    #[display("It's {}'s turn, not {}'s", expected, got)]
    WrongPlayer {
        /// Player whose turn it is.
        expected: Player,
        /// Player that tried to move.
        got: Player,
    },
}

impl std::error::Error for MoveError {}

impl MoveError {
    /// Out-of-bounds error for unsigned coordinates.
    pub fn out_of_bounds(mv: Move) -> Self {
        MoveError::OutOfBounds {
            row: i64::try_from(mv.row).unwrap_or(i64::MAX),
            col: i64::try_from(mv.col).unwrap_or(i64::MAX),
        }
    }
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// The board.
    board: Board,
    /// Current player to move.
    current_player: Player,
    /// Game phase.
    phase: Phase,
    /// Moves played, in order.
    history: Vec<Move>,
}

impl GameState {
    /// Creates a new game: empty board, X to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Player::X,
            phase: Phase::InProgress,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the current player.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns the game phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the move history.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Checks a move without applying it.
    ///
    /// # Errors
    ///
    /// `GameOver` outside `InProgress`, `WrongPlayer` when `player` is not to
    /// move, `OutOfBounds` off the board, `CellOccupied` on a taken cell.
    #[instrument(skip(self), fields(phase = ?self.phase, to_move = %self.current_player))]
    pub fn validate(&self, player: Player, mv: Move) -> Result<(), MoveError> {
        if self.phase.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if player != self.current_player {
            return Err(MoveError::WrongPlayer {
                expected: self.current_player,
                got: player,
            });
        }
        match self.board.get(mv) {
            None => Err(MoveError::out_of_bounds(mv)),
            Some(Cell::Occupied(owner)) => Err(MoveError::CellOccupied(mv, owner)),
            Some(Cell::Empty) => Ok(()),
        }
    }

    /// Validates and applies a move, returning the resulting phase.
    ///
    /// On success the cell is marked, the phase is recomputed, and the turn
    /// passes to the opponent unless the game just ended.
    #[instrument(skip(self))]
    pub fn apply(&mut self, player: Player, mv: Move) -> Result<Phase, MoveError> {
        self.validate(player, mv)?;

        self.board.set(mv, Cell::Occupied(player));
        self.history.push(mv);

        self.phase = if check_winner(&self.board) == Some(player) {
            Phase::Won(player)
        } else if is_full(&self.board) {
            Phase::Draw
        } else {
            self.current_player = player.opponent();
            Phase::InProgress
        };

        debug!(phase = ?self.phase, moves = self.history.len(), "Move applied");
        Ok(self.phase)
    }

    /// Ends an in-progress game with an outcome decided elsewhere, leaving the
    /// board untouched.
    #[instrument(skip(self))]
    pub fn conclude(&mut self, outcome: Outcome) -> Result<Phase, MoveError> {
        if self.phase.is_terminal() {
            return Err(MoveError::GameOver);
        }
        self.phase = outcome.into();
        debug!(phase = ?self.phase, "Game concluded without a move");
        Ok(self.phase)
    }

    /// Returns to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(moves: &[(usize, usize)]) -> GameState {
        let mut state = GameState::new();
        for &(row, col) in moves {
            let player = state.current_player();
            state.apply(player, Move::new(row, col)).expect("legal move");
        }
        state
    }

    #[test]
    fn test_new_game() {
        let state = GameState::new();
        assert_eq!(state.current_player(), Player::X);
        assert_eq!(state.phase(), Phase::InProgress);
        assert_eq!(state.board().occupied(), 0);
    }

    #[test]
    fn test_center_opening() {
        let state = play(&[(1, 1)]);
        assert_eq!(
            state.board().get(Move::new(1, 1)),
            Some(Cell::Occupied(Player::X))
        );
        assert_eq!(state.current_player(), Player::O);
        assert_eq!(state.phase(), Phase::InProgress);
    }

    #[test]
    fn test_occupied_rejected() {
        let mut state = play(&[(1, 1)]);
        let before = state.clone();
        let err = state.apply(Player::O, Move::new(1, 1)).unwrap_err();
        assert_eq!(err, MoveError::CellOccupied(Move::new(1, 1), Player::X));
        assert_eq!(state, before);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut state = GameState::new();
        let err = state.apply(Player::X, Move::new(3, 0)).unwrap_err();
        assert_eq!(err, MoveError::OutOfBounds { row: 3, col: 0 });
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_wrong_player_rejected() {
        let mut state = GameState::new();
        let err = state.apply(Player::O, Move::new(0, 0)).unwrap_err();
        assert_eq!(
            err,
            MoveError::WrongPlayer {
                expected: Player::X,
                got: Player::O
            }
        );
    }

    #[test]
    fn test_win_keeps_winner_to_move() {
        let state = play(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        assert_eq!(state.phase(), Phase::Won(Player::X));
        assert_eq!(state.history().len(), 5);
    }

    #[test]
    fn test_terminal_rejects_moves() {
        let mut state = play(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        let err = state.apply(Player::X, Move::new(2, 2)).unwrap_err();
        assert_eq!(err, MoveError::GameOver);
        assert_eq!(state.conclude(Outcome::Draw), Err(MoveError::GameOver));
        assert_eq!(state.phase(), Phase::Won(Player::X));
    }

    #[test]
    fn test_conclude_keeps_board() {
        let mut state = play(&[(1, 1)]);
        let board = *state.board();
        assert_eq!(state.conclude(Outcome::Draw), Ok(Phase::Draw));
        assert_eq!(state.board(), &board);
    }

    #[test]
    fn test_reset() {
        let mut state = play(&[(1, 1), (0, 0)]);
        state.reset();
        assert_eq!(state, GameState::new());
    }
}
