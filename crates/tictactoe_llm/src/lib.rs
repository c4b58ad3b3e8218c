//! Tic-tac-toe in the terminal against a language-model opponent.
//!
//! # Architecture
//!
//! - **Completion**: one logical exchange with a chat-completion service,
//!   with per-attempt timeout, bounded retries and linear backoff
//! - **Opponent**: prompt construction and parsing of the free-text reply
//! - **Engine**: owns the [`GameState`](tictactoe_rules::GameState) and
//!   holds every opponent proposal to the same rules as the human's moves
//! - **Config**: defaults, TOML file, environment
//! - **TUI**: ratatui front end
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_llm::{AppConfig, CompletionClient, Engine, build_transport};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let transport = build_transport(&config.create_llm_config()?);
//! let client = CompletionClient::new(transport, config.completion_settings(), config.retry_policy());
//! let mut engine = Engine::new(client, config.engine_settings());
//!
//! engine.apply_human_move(1, 1)?;
//! engine.request_opponent_move().await?;
//! println!("{}", engine.current_board().display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod completion;
pub mod config;
pub mod engine;
pub mod opponent;
pub mod tui;

pub use completion::{
    ChatMessage, CompletionClient, CompletionError, CompletionRequest, CompletionSettings,
    CompletionTransport, LlmConfig, LlmProvider, RetryPolicy, Role, TransportError,
    TransportErrorKind, TransportReply, build_transport,
};
pub use config::{AppConfig, ConfigError};
pub use engine::{Engine, EngineError, EngineSettings, OpponentTurn, TerminalPolicy};
pub use tictactoe_rules::{Board, Cell, GameState, Move, MoveError, Outcome, Phase, Player};
