//! The opponent turn protocol: what we send and how we read the answer.

mod prompt;
mod reply;

pub use prompt::{describe_board, opponent_prompt};
pub use reply::{DeclaredStatus, OpponentReply, ProposedMove, ReplyError, parse_reply};
