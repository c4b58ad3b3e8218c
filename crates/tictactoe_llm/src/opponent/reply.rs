//! Parsing of the opponent's free-text reply.
//!
//! The completion service is asked for JSON but is not bound by it. Replies
//! are reduced to an [`OpponentReply`] before anything touches game state;
//! nothing here decides whether a move is legal.

use serde::Deserialize;
use tictactoe_rules::Player;
use tracing::{debug, instrument, warn};

/// Coordinates exactly as the opponent sent them; may be off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedMove {
    /// Row, 0 at the top.
    pub row: i64,
    /// Column, 0 at the left.
    pub col: i64,
}

/// A game end claimed by the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredStatus {
    /// A win, with the winner when the reply names one.
    Won(Option<Player>),
    /// A draw.
    Draw,
    /// "Game over" without saying how it ended.
    GameOver,
}

impl std::fmt::Display for DeclaredStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclaredStatus::Won(Some(player)) => write!(f, "{} wins", player),
            DeclaredStatus::Won(None) => write!(f, "a win"),
            DeclaredStatus::Draw => write!(f, "a draw"),
            DeclaredStatus::GameOver => write!(f, "game over"),
        }
    }
}

/// Structured content of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentReply {
    /// The opponent wants to play here.
    Move(ProposedMove),
    /// The opponent declares the game over instead of moving.
    Terminal(DeclaredStatus),
}

/// Why a reply could not be used.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ReplyError {
    /// No `{ ... }` span in the text.
    #[display("Reply contains no JSON object")]
    NoJson,
    /// The span is not the expected JSON shape.
    #[display("Reply is not valid move JSON: {}", _0)]
    InvalidJson(String),
    /// A move with only one coordinate.
    #[display("Move is missing its {} coordinate", _0)]
    IncompleteMove(&'static str),
    /// Valid JSON with neither a move nor a recognizable game-end status.
    #[display("Reply carries neither a move nor a terminal status")]
    NoMoveOrStatus,
    /// A game end was declared without naming the outcome.
    #[display("Declared {} without naming the outcome", _0)]
    UnnamedOutcome(DeclaredStatus),
    /// A declared game end that the board does not support.
    #[display("Declared {} but the board does not show it", _0)]
    UnconfirmedOutcome(DeclaredStatus),
}

impl std::error::Error for ReplyError {}

#[derive(Debug, Deserialize)]
struct RawReply {
    #[serde(rename = "move")]
    mv: Option<RawMove>,
    row: Option<i64>,
    col: Option<i64>,
    status: Option<String>,
    winner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMove {
    row: Option<i64>,
    col: Option<i64>,
}

/// Parses reply text into an [`OpponentReply`].
///
/// Accepts `{"row": r, "col": c}`, `{"move": {"row": r, "col": c}}`, an
/// optional `status` string and an optional `winner` mark. `"move": null` is
/// an explicit "no move". Code fences and prose around the object are
/// ignored: the outermost `{ ... }` span is what gets parsed. A move wins over
/// a status when both are present.
///
/// ```
/// use tictactoe_llm::opponent::{OpponentReply, ProposedMove, parse_reply};
///
/// let reply = parse_reply("```json\n{\"row\": 0, \"col\": 2}\n```").unwrap();
/// assert_eq!(reply, OpponentReply::Move(ProposedMove { row: 0, col: 2 }));
/// ```
#[instrument(skip(text), fields(length = text.len()))]
pub fn parse_reply(text: &str) -> Result<OpponentReply, ReplyError> {
    let json = extract_object(text).ok_or_else(|| {
        warn!(reply = %text, "No JSON object in opponent reply");
        ReplyError::NoJson
    })?;

    let raw: RawReply = serde_json::from_str(json).map_err(|e| {
        warn!(reply = %text, error = %e, "Opponent reply is not valid JSON");
        ReplyError::InvalidJson(e.to_string())
    })?;

    let (row, col) = match &raw.mv {
        Some(mv) => (mv.row, mv.col),
        None => (raw.row, raw.col),
    };
    match (row, col) {
        (Some(row), Some(col)) => {
            debug!(row, col, "Opponent proposed a move");
            return Ok(OpponentReply::Move(ProposedMove { row, col }));
        }
        (Some(_), None) => return Err(ReplyError::IncompleteMove("col")),
        (None, Some(_)) => return Err(ReplyError::IncompleteMove("row")),
        (None, None) => {}
    }

    match declared_status(raw.status.as_deref(), raw.winner.as_deref()) {
        Some(status) => {
            debug!(%status, "Opponent declared the game over");
            Ok(OpponentReply::Terminal(status))
        }
        None => Err(ReplyError::NoMoveOrStatus),
    }
}

/// The outermost `{ ... }` span of `text`.
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Reads a game-end claim out of the free-form `status` and `winner` fields.
fn declared_status(status: Option<&str>, winner: Option<&str>) -> Option<DeclaredStatus> {
    let text = format!("{} {}", status.unwrap_or_default(), winner.unwrap_or_default())
        .to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter(|w| !w.is_empty())
        .collect();
    let has = |options: &[&str]| words.iter().any(|w| options.contains(w));

    if has(&["draw", "drawn", "tie", "tied", "stalemate"]) {
        return Some(DeclaredStatus::Draw);
    }

    let winner_mark = winner.and_then(Player::from_mark);
    if winner_mark.is_some() || has(&["win", "wins", "won", "winner", "victory"]) {
        let named = winner_mark.or_else(|| words.iter().find_map(|w| Player::from_mark(w)));
        return Some(DeclaredStatus::Won(named));
    }

    if words.join(" ").contains("game over") || has(&["gameover"]) {
        return Some(DeclaredStatus::GameOver);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(row: i64, col: i64) -> Result<OpponentReply, ReplyError> {
        Ok(OpponentReply::Move(ProposedMove { row, col }))
    }

    #[test]
    fn test_flat_move() {
        assert_eq!(parse_reply(r#"{"row": 1, "col": 2}"#), mv(1, 2));
    }

    #[test]
    fn test_nested_move() {
        assert_eq!(parse_reply(r#"{"move":{"row":0,"col":0}}"#), mv(0, 0));
    }

    #[test]
    fn test_prose_and_fences_ignored() {
        let text = "Sure! I'll take the corner.\n```json\n{\"row\": 2, \"col\": 0}\n```";
        assert_eq!(parse_reply(text), mv(2, 0));
    }

    #[test]
    fn test_out_of_range_still_parses() {
        assert_eq!(parse_reply(r#"{"row": -1, "col": 5}"#), mv(-1, 5));
    }

    #[test]
    fn test_move_beats_status() {
        assert_eq!(
            parse_reply(r#"{"move": {"row": 2, "col": 2}, "status": "O wins"}"#),
            mv(2, 2)
        );
    }

    #[test]
    fn test_not_json() {
        assert_eq!(parse_reply("I think the center is best."), Err(ReplyError::NoJson));
        assert_eq!(parse_reply(""), Err(ReplyError::NoJson));
        assert_eq!(parse_reply("} {"), Err(ReplyError::NoJson));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_reply(r#"{"row": "one", "col": 2}"#),
            Err(ReplyError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_reply("{row: 1, col: 2}"),
            Err(ReplyError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_incomplete_move() {
        assert_eq!(
            parse_reply(r#"{"row": 1}"#),
            Err(ReplyError::IncompleteMove("col"))
        );
        assert_eq!(
            parse_reply(r#"{"move": {"col": 1}}"#),
            Err(ReplyError::IncompleteMove("row"))
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert_eq!(
            parse_reply(r#"{"move": null, "status": "It's a draw"}"#),
            Ok(OpponentReply::Terminal(DeclaredStatus::Draw))
        );
        assert_eq!(
            parse_reply(r#"{"status": "Game over - O wins!"}"#),
            Ok(OpponentReply::Terminal(DeclaredStatus::Won(Some(Player::O))))
        );
        assert_eq!(
            parse_reply(r#"{"status": "game over", "winner": "X"}"#),
            Ok(OpponentReply::Terminal(DeclaredStatus::Won(Some(Player::X))))
        );
        assert_eq!(
            parse_reply(r#"{"status": "you win"}"#),
            Ok(OpponentReply::Terminal(DeclaredStatus::Won(None)))
        );
        assert_eq!(
            parse_reply(r#"{"status": "Game Over"}"#),
            Ok(OpponentReply::Terminal(DeclaredStatus::GameOver))
        );
    }

    #[test]
    fn test_contractions_are_not_claims() {
        assert_eq!(
            parse_reply(r#"{"status": "I won't lose"}"#),
            Err(ReplyError::NoMoveOrStatus)
        );
        assert_eq!(
            parse_reply(r#"{"status": "X won't win, it's a draw"}"#),
            Ok(OpponentReply::Terminal(DeclaredStatus::Draw))
        );
        assert_eq!(
            parse_reply(r#"{"status": "O won!"}"#),
            Ok(OpponentReply::Terminal(DeclaredStatus::Won(Some(Player::O))))
        );
    }

    #[test]
    fn test_no_move_or_status() {
        assert_eq!(parse_reply("{}"), Err(ReplyError::NoMoveOrStatus));
        assert_eq!(
            parse_reply(r#"{"move": null, "status": "thinking"}"#),
            Err(ReplyError::NoMoveOrStatus)
        );
    }
}
