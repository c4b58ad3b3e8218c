//! Application state and logic.

use crate::engine::{Engine, OpponentTurn};
use tictactoe_rules::Move;
use tracing::{debug, warn};

/// Main application state.
#[derive(Debug)]
pub struct App {
    engine: Engine,
    cursor: Move,
    status_message: Option<String>,
    opponent_failed: bool,
}

impl App {
    /// Creates a new application around an engine.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            cursor: Move::new(1, 1),
            status_message: None,
            opponent_failed: false,
        }
    }

    /// Gets the engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Gets the highlighted cell.
    pub fn cursor(&self) -> Move {
        self.cursor
    }

    /// Moves the highlight.
    pub fn set_cursor(&mut self, cursor: Move) {
        self.cursor = cursor;
    }

    /// Line shown under the board.
    pub fn status(&self) -> String {
        self.status_message
            .clone()
            .unwrap_or_else(|| self.engine.status_line())
    }

    /// True when the loop should run the opponent's turn on its own.
    pub fn wants_opponent_turn(&self) -> bool {
        self.engine.is_opponent_turn() && !self.opponent_failed
    }

    /// Plays the human's mark at `mv`.
    pub fn place(&mut self, mv: Move) {
        match self.engine.apply_human_move(mv.row, mv.col) {
            Ok(_) => {
                self.cursor = mv;
                self.status_message = None;
            }
            Err(e) => {
                debug!(error = %e, "Move rejected");
                self.status_message = Some(format!("Error: {}", e));
            }
        }
    }

    /// Marks the opponent as thinking.
    pub fn set_thinking(&mut self) {
        self.status_message = Some(format!("Opponent ({}) is thinking...", self.engine.opponent()));
    }

    /// Runs one opponent turn and records the result for display.
    pub async fn play_opponent_turn(&mut self) {
        match self.engine.request_opponent_move().await {
            Ok(OpponentTurn::Moved(mv)) => {
                debug!(%mv, "Opponent moved");
                self.opponent_failed = false;
                self.status_message = None;
            }
            Ok(OpponentTurn::Declared(outcome)) => {
                self.opponent_failed = false;
                self.status_message = Some(format!(
                    "The opponent declared: {}. Press 'r' to play again",
                    outcome
                ));
            }
            Err(e) => {
                warn!(error = %e, "Opponent turn failed");
                self.opponent_failed = true;
                self.status_message = Some(format!(
                    "Error: {}. Press 't' to retry or 'r' to restart",
                    e
                ));
            }
        }
    }

    /// Allows the opponent another attempt after a failure.
    pub fn retry_opponent(&mut self) {
        if self.opponent_failed {
            debug!("Retrying opponent turn");
            self.opponent_failed = false;
        }
    }

    /// Restarts the game.
    pub fn restart(&mut self) {
        debug!("Restarting game");
        self.engine.reset();
        self.cursor = Move::new(1, 1);
        self.status_message = None;
        self.opponent_failed = false;
    }
}
