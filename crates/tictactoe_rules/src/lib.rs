//! Pure tic-tac-toe game logic.
//!
//! # Architecture
//!
//! - **Types**: [`Player`], [`Cell`], [`Move`]
//! - **Board**: the fixed 3x3 grid, serializable as rows of marks
//! - **Rules**: win and draw detection over a board
//! - **Game**: [`GameState`], the turn state machine that validates and
//!   applies moves
//!
//! # Example
//!
//! ```
//! use tictactoe_rules::{GameState, Move, Phase, Player};
//!
//! let mut game = GameState::new();
//! assert_eq!(game.apply(Player::X, Move::new(1, 1)), Ok(Phase::InProgress));
//! assert_eq!(game.current_player(), Player::O);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod game;
mod phase;
pub mod rules;
mod types;

pub use board::Board;
pub use game::{GameState, MoveError};
pub use phase::{Outcome, Phase};
pub use types::{Cell, Move, Player};
