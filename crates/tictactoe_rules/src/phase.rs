//! Game phase and outcome.

use crate::Player;
use serde::{Deserialize, Serialize};

/// Top-level state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Game is ongoing.
    InProgress,
    /// Game ended in a win.
    Won(Player),
    /// Game ended in a draw.
    Draw,
}

impl Phase {
    /// True for `Won` and `Draw`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::InProgress)
    }

    /// The outcome of a finished game, `None` while in progress.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Phase::InProgress => None,
            Phase::Won(player) => Some(Outcome::Winner(*player)),
            Phase::Draw => Some(Outcome::Draw),
        }
    }
}

impl From<Outcome> for Phase {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Winner(player) => Phase::Won(player),
            Outcome::Draw => Phase::Draw,
        }
    }
}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Player won the game.
    Winner(Player),
    /// Game ended in a draw.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Winner(player) => Some(*player),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "{} wins", player),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}
