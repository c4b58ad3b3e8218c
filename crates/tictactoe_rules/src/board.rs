//! The 3x3 board.

use crate::types::{Cell, Move, Player};
use serde::Serialize;

/// 3x3 tic-tac-toe board.
///
/// `Board` is `Copy`: handing one out never exposes the owner's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; 3]; 3],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from rows of marks; anything other than `X`/`O` is empty.
    ///
    /// ```
    /// use tictactoe_rules::{Board, Cell, Move, Player};
    ///
    /// let board = Board::from_rows(["XX.", "OO.", "..."]);
    /// assert_eq!(board.get(Move::new(1, 0)), Some(Cell::Occupied(Player::O)));
    /// ```
    pub fn from_rows(rows: [&str; 3]) -> Self {
        let mut board = Self::new();
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().take(3).enumerate() {
                board.cells[r][c] = match ch {
                    'X' | 'x' => Cell::Occupied(Player::X),
                    'O' | 'o' => Cell::Occupied(Player::O),
                    _ => Cell::Empty,
                };
            }
        }
        board
    }

    /// Gets the cell at the given move, `None` when out of bounds.
    pub fn get(&self, mv: Move) -> Option<Cell> {
        self.cells.get(mv.row)?.get(mv.col).copied()
    }

    /// Sets the cell at the given move. Out-of-bounds moves are ignored and
    /// reported as `false`.
    pub fn set(&mut self, mv: Move, cell: Cell) -> bool {
        match self.cells.get_mut(mv.row).and_then(|row| row.get_mut(mv.col)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Checks if the cell at `mv` exists and is empty.
    pub fn is_empty(&self, mv: Move) -> bool {
        matches!(self.get(mv), Some(Cell::Empty))
    }

    /// Rows of cells.
    pub fn rows(&self) -> &[[Cell; 3]; 3] {
        &self.cells
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Cell::Empty)
            .count()
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Move> {
        (0..9)
            .filter_map(Move::from_index)
            .filter(|mv| self.is_empty(*mv))
            .collect()
    }

    /// Formats the board as a human-readable grid; empty cells show their key (1-9).
    pub fn display(&self) -> String {
        let mut result = String::new();
        for (r, row) in self.cells.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(c, cell)| match cell {
                    Cell::Empty => (r * 3 + c + 1).to_string(),
                    occupied => occupied.symbol().to_string(),
                })
                .collect();
            result.push_str(&line.join(" | "));
            if r < 2 {
                result.push_str("\n--+---+--\n");
            }
        }
        result
    }
}
