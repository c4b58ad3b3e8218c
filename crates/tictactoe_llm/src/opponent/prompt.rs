//! Prompt construction for the opponent turn.

use crate::completion::ChatMessage;
use tictactoe_rules::{Board, Player};
use tracing::instrument;

/// Builds the two-segment prompt asking `to_move` for its next move.
///
/// The output depends only on the board and the mover, so the same position
/// always produces the same prompt.
#[instrument(skip(board), fields(to_move = %to_move))]
pub fn opponent_prompt(board: &Board, to_move: Player) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You are a Tic Tac Toe AI player. Analyze the board and make the best move for {}.",
            to_move
        )),
        ChatMessage::user(format!(
            "Game state: {}. Rows and columns are numbered 0-2 from the top left; \
             \"\" marks an empty cell. You're '{}'. What's your next move? \
             Respond with JSON {{\"row\": number, \"col\": number}}.",
            describe_board(board),
            to_move
        )),
    ]
}

/// The board as JSON rows of marks, e.g. `[["X","",""],["","O",""],["","",""]]`.
pub fn describe_board(board: &Board) -> String {
    // Serializing three rows of static strings cannot fail.
    serde_json::to_string(board).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::Role;

    #[test]
    fn test_prompt_shape() {
        let board = Board::from_rows(["X..", "...", "..."]);
        let messages = opponent_prompt(&board, Player::O);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.ends_with("best move for O."));
        assert_eq!(messages[1].role, Role::User);
        assert!(
            messages[1]
                .content
                .starts_with(r#"Game state: [["X","",""],["","",""],["","",""]]."#)
        );
        assert!(messages[1].content.contains(r#"{"row": number, "col": number}"#));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let board = Board::from_rows(["XO.", ".X.", "..O"]);
        assert_eq!(
            opponent_prompt(&board, Player::X),
            opponent_prompt(&board, Player::X)
        );
    }
}
