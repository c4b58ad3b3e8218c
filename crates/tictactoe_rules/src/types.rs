//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize, Serializer};
use tracing::instrument;

/// Player in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum Player {
    /// Player X (goes first).
    #[serde(alias = "x")]
    X,
    /// Player O (goes second).
    #[serde(alias = "o")]
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Parses a bare mark ("X", "o", " x ").
    pub fn from_mark(s: &str) -> Option<Self> {
        match s.trim() {
            "X" | "x" => Some(Player::X),
            "O" | "o" => Some(Player::O),
            _ => None,
        }
    }
}

/// A cell on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a player.
    Occupied(Player),
}

impl Cell {
    /// Mark shown for this cell; empty cells are the empty string.
    pub fn symbol(self) -> &'static str {
        match self {
            Cell::Empty => "",
            Cell::Occupied(Player::X) => "X",
            Cell::Occupied(Player::O) => "O",
        }
    }

    /// Returns the occupant, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }
}

// Cells serialize as their bare mark so a board reads as `[["X","",""],...]`.
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

/// A target cell, by row and column.
///
/// Construction does not check bounds: moves arrive from the keyboard and
/// from the opponent's reply, and both go through the same legality check
/// in [`GameState::apply`](crate::GameState::apply).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Row index, 0 at the top.
    pub row: usize,
    /// Column index, 0 at the left.
    pub col: usize,
}

impl Move {
    /// Creates a new move.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Converts signed coordinates, as found in an untrusted reply.
    ///
    /// Returns `None` for negative values; large values survive and are
    /// rejected later by the bounds check.
    #[instrument]
    pub fn from_signed(row: i64, col: i64) -> Option<Self> {
        Some(Self {
            row: usize::try_from(row).ok()?,
            col: usize::try_from(col).ok()?,
        })
    }

    /// True when both coordinates lie on a 3x3 board.
    pub fn in_bounds(&self) -> bool {
        self.row < 3 && self.col < 3
    }

    /// Row-major index 0-8, if in bounds.
    pub fn index(&self) -> Option<usize> {
        self.in_bounds().then_some(self.row * 3 + self.col)
    }

    /// Inverse of [`Move::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        (index < 9).then_some(Self::new(index / 3, index % 3))
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
