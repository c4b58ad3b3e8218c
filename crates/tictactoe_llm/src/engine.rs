//! Game engine: authoritative state plus the opponent turn protocol.
//!
//! The engine is the only owner of [`GameState`]. Human moves and opponent
//! replies both end up in [`GameState::apply`], so a move the opponent
//! proposes is held to exactly the rules the keyboard is. Every failing
//! operation returns with the state untouched.
//!
//! All mutating operations take `&mut self`; only one turn can be in flight
//! at a time. Wrap the engine in `tokio::sync::Mutex` to share it across tasks.

use crate::completion::{CompletionClient, CompletionError};
use crate::opponent::{DeclaredStatus, OpponentReply, ReplyError, opponent_prompt, parse_reply};
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tictactoe_rules::rules::{check_winner, is_settled_draw};
use tictactoe_rules::{Board, GameState, Move, MoveError, Outcome, Phase, Player};
use tracing::{debug, info, instrument, warn};

/// How to treat an opponent reply that ends the game without a move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TerminalPolicy {
    /// Accept any declaration that names its outcome.
    Trust,
    /// Accept a declaration only if the board shows it.
    #[default]
    Verify,
}

/// Engine behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct EngineSettings {
    /// Mark played from the keyboard.
    human: Player,
    /// Handling of declared game ends.
    terminal_policy: TerminalPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            human: Player::X,
            terminal_policy: TerminalPolicy::Verify,
        }
    }
}

/// What the opponent did on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentTurn {
    /// Played a validated move.
    Moved(Move),
    /// Ended the game without moving.
    Declared(Outcome),
}

/// Errors reported by engine operations.
#[derive(Debug, derive_more::Display)]
pub enum EngineError {
    /// The human's move, or an out-of-turn call, broke the rules.
    #[display("Illegal move: {}", _0)]
    IllegalMove(MoveError),
    /// The opponent proposed a move that breaks the rules.
    #[display("Opponent proposed an illegal move: {}", _0)]
    IllegalOpponentMove(MoveError),
    /// The opponent's reply could not be used.
    #[display("Malformed opponent reply: {}", _0)]
    MalformedOpponentReply(ReplyError),
    /// The completion exchange failed after retries.
    #[display("Opponent move failed: {}", _0)]
    OpponentMoveFailed(CompletionError),
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::IllegalMove(e) | EngineError::IllegalOpponentMove(e) => Some(e),
            EngineError::MalformedOpponentReply(e) => Some(e),
            EngineError::OpponentMoveFailed(e) => Some(e),
        }
    }
}

/// Tic-tac-toe engine playing a human against a completion-backed opponent.
#[derive(Debug)]
pub struct Engine {
    state: GameState,
    client: CompletionClient,
    settings: EngineSettings,
}

impl Engine {
    /// Creates an engine with a fresh game.
    #[instrument(skip(client))]
    pub fn new(client: CompletionClient, settings: EngineSettings) -> Self {
        info!("Creating game engine");
        Self {
            state: GameState::new(),
            client,
            settings,
        }
    }

    /// Snapshot of the board.
    pub fn current_board(&self) -> Board {
        *self.state.board()
    }

    /// Player to move (the last mover once the game is over).
    pub fn current_player(&self) -> Player {
        self.state.current_player()
    }

    /// Game phase.
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Moves played so far.
    pub fn history(&self) -> &[Move] {
        self.state.history()
    }

    /// The human's mark.
    pub fn human(&self) -> Player {
        self.settings.human
    }

    /// The opponent's mark.
    pub fn opponent(&self) -> Player {
        self.settings.human.opponent()
    }

    /// True while the game is running and the opponent is to move.
    pub fn is_opponent_turn(&self) -> bool {
        !self.is_terminal() && self.current_player() == self.opponent()
    }

    /// True once the game is won or drawn.
    pub fn is_terminal(&self) -> bool {
        self.state.phase().is_terminal()
    }

    /// The outcome, once there is one.
    pub fn winner(&self) -> Option<Outcome> {
        self.state.phase().outcome()
    }

    /// Plays the human's mark at (`row`, `col`).
    ///
    /// # Errors
    ///
    /// `IllegalMove` when the game is over, it is the opponent's turn, the
    /// coordinates are off the board, or the cell is taken.
    #[instrument(skip(self), fields(human = %self.settings.human))]
    pub fn apply_human_move(&mut self, row: usize, col: usize) -> Result<Phase, EngineError> {
        let mv = Move::new(row, col);
        let phase = self
            .state
            .apply(self.settings.human, mv)
            .map_err(|e| {
                debug!(error = %e, "Human move rejected");
                EngineError::IllegalMove(e)
            })?;
        info!(%mv, ?phase, "Human move applied");
        Ok(phase)
    }

    /// Asks the completion service for the opponent's move and applies it.
    ///
    /// # Errors
    ///
    /// - `IllegalMove` if it is not the opponent's turn (no request is sent)
    /// - `OpponentMoveFailed` if the exchange failed after retries
    /// - `MalformedOpponentReply` if the reply has no usable move or status
    /// - `IllegalOpponentMove` if the proposed move breaks the rules
    #[instrument(skip(self), fields(opponent = %self.opponent(), moves = self.state.history().len()))]
    pub async fn request_opponent_move(&mut self) -> Result<OpponentTurn, EngineError> {
        let opponent = self.opponent();
        if self.is_terminal() {
            return Err(EngineError::IllegalMove(MoveError::GameOver));
        }
        if self.current_player() != opponent {
            return Err(EngineError::IllegalMove(MoveError::WrongPlayer {
                expected: self.current_player(),
                got: opponent,
            }));
        }

        let messages = opponent_prompt(self.state.board(), opponent);
        let text = self
            .client
            .complete(messages)
            .await
            .map_err(EngineError::OpponentMoveFailed)?;
        debug!(reply = %text, "Opponent replied");

        match parse_reply(&text).map_err(EngineError::MalformedOpponentReply)? {
            OpponentReply::Move(proposed) => {
                let mv = Move::from_signed(proposed.row, proposed.col).ok_or(
                    EngineError::IllegalOpponentMove(MoveError::OutOfBounds {
                        row: proposed.row,
                        col: proposed.col,
                    }),
                )?;
                let phase = self.state.apply(opponent, mv).map_err(|e| {
                    warn!(%mv, error = %e, "Opponent proposed an illegal move");
                    EngineError::IllegalOpponentMove(e)
                })?;
                info!(%mv, ?phase, "Opponent move applied");
                Ok(OpponentTurn::Moved(mv))
            }
            OpponentReply::Terminal(declared) => {
                let outcome = self
                    .resolve_declaration(declared)
                    .map_err(EngineError::MalformedOpponentReply)?;
                self.state
                    .conclude(outcome)
                    .map_err(EngineError::IllegalOpponentMove)?;
                info!(%outcome, "Opponent ended the game");
                Ok(OpponentTurn::Declared(outcome))
            }
        }
    }

    /// Turns a declared game end into an outcome under the terminal policy.
    fn resolve_declaration(&self, declared: DeclaredStatus) -> Result<Outcome, ReplyError> {
        match self.settings.terminal_policy {
            TerminalPolicy::Trust => match declared {
                DeclaredStatus::Won(Some(player)) => Ok(Outcome::Winner(player)),
                DeclaredStatus::Draw => Ok(Outcome::Draw),
                DeclaredStatus::Won(None) | DeclaredStatus::GameOver => {
                    Err(ReplyError::UnnamedOutcome(declared))
                }
            },
            TerminalPolicy::Verify => {
                let board = self.state.board();
                let observed = match check_winner(board) {
                    Some(player) => Some(Outcome::Winner(player)),
                    None if is_settled_draw(board) => Some(Outcome::Draw),
                    None => None,
                };
                match (declared, observed) {
                    (DeclaredStatus::Won(Some(claimed)), Some(Outcome::Winner(actual)))
                        if claimed == actual =>
                    {
                        Ok(Outcome::Winner(actual))
                    }
                    (DeclaredStatus::Won(None), Some(Outcome::Winner(actual))) => {
                        Ok(Outcome::Winner(actual))
                    }
                    (DeclaredStatus::Draw, Some(Outcome::Draw)) => Ok(Outcome::Draw),
                    (DeclaredStatus::GameOver, Some(outcome)) => Ok(outcome),
                    _ => {
                        warn!(%declared, ?observed, "Declared game end not supported by board");
                        Err(ReplyError::UnconfirmedOutcome(declared))
                    }
                }
            }
        }
    }

    /// Starts a new game. Settings are kept.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting game");
        self.state.reset();
    }

    /// One-line description of the game for display.
    pub fn status_line(&self) -> String {
        let human = self.human();
        match self.phase() {
            Phase::InProgress if self.current_player() == human => {
                format!("Your turn ({}) - Use numbers 1-9 to make a move", human)
            }
            Phase::InProgress => format!("Waiting for the opponent ({})", self.opponent()),
            Phase::Won(player) if player == human => {
                format!("You win ({})! Press 'r' to play again", player)
            }
            Phase::Won(player) => format!("{} wins! Press 'r' to play again", player),
            Phase::Draw => "It's a draw! Press 'r' to play again".to_string(),
        }
    }
}
