//! Draw detection logic for tic-tac-toe.

use super::win::{LINES, check_winner};
use crate::{Board, Cell, Player};
use strum::IntoEnumIterator;
use tracing::instrument;

/// Checks if the board is full (all cells occupied).
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.occupied() == 9
}

/// A full board with no winner.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && check_winner(board).is_none()
}

/// No line can still be completed: every line already holds both marks.
///
/// This is the strongest draw claim that can be checked from the board alone
/// before it fills up.
#[instrument(skip(board))]
pub fn is_settled_draw(board: &Board) -> bool {
    if check_winner(board).is_some() {
        return false;
    }
    LINES.iter().all(|line| {
        Player::iter().all(|p| line.iter().any(|mv| board.get(*mv) == Some(Cell::Occupied(p))))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_full_board() {
        let board = Board::from_rows(["XXX", "XXX", "XXX"]);
        assert!(is_full(&board));
    }

    #[test]
    fn test_draw_detection() {
        let board = Board::from_rows(["XOX", "XOO", "OXX"]);
        assert!(is_draw(&board));
        assert!(is_settled_draw(&board));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let board = Board::from_rows(["XXX", "OO.", "..."]);
        assert!(!is_draw(&board));
        assert!(!is_settled_draw(&board));
    }

    #[test]
    fn test_settled_before_full() {
        // Bottom-right is open, but every line through it is already blocked.
        let board = Board::from_rows(["XOX", "XOO", "OX."]);
        assert!(!is_full(&board));
        assert!(is_settled_draw(&board));
    }

    #[test]
    fn test_open_line_is_not_settled() {
        let board = Board::from_rows(["X..", ".O.", "..."]);
        assert!(!is_settled_draw(&board));
    }
}
