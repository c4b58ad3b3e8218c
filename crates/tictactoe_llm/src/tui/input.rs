//! Keyboard mapping.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tictactoe_rules::Move;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Play at a cell.
    Place(Move),
    /// Move the highlight.
    Cursor(Move),
    /// Start over.
    Reset,
    /// Ask the opponent again after a failed turn.
    RetryOpponent,
    /// Leave the game.
    Quit,
    /// Nothing bound to this key.
    Ignore,
}

/// Keys 1-9 map to cells left to right, top to bottom.
pub fn key_to_move(c: char) -> Option<Move> {
    let digit = c.to_digit(10)?;
    let index = usize::try_from(digit).ok()?.checked_sub(1)?;
    Move::from_index(index)
}

/// Moves cursor based on arrow keys, stopping at the edges.
pub fn move_cursor(cursor: Move, key: KeyCode) -> Move {
    match key {
        KeyCode::Right if cursor.col < 2 => Move::new(cursor.row, cursor.col + 1),
        KeyCode::Left if cursor.col > 0 => Move::new(cursor.row, cursor.col - 1),
        KeyCode::Down if cursor.row < 2 => Move::new(cursor.row + 1, cursor.col),
        KeyCode::Up if cursor.row > 0 => Move::new(cursor.row - 1, cursor.col),
        // No change for other keys or edge cases
        _ => cursor,
    }
}

/// Translates a key press given the current cursor.
pub fn action_for(key: KeyEvent, cursor: Move) -> Action {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char('t') => Action::RetryOpponent,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Place(cursor),
        KeyCode::Char(c) => key_to_move(c).map_or(Action::Ignore, Action::Place),
        code @ (KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right) => {
            Action::Cursor(move_cursor(cursor, code))
        }
        _ => Action::Ignore,
    }
}
