//! Command-line interface for tictactoe_llm.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tictactoe_llm::{AppConfig, LlmProvider, Player};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tictactoe_llm.toml";

/// Tic-tac-toe against a language model
#[derive(Parser, Debug)]
#[command(name = "tictactoe_llm")]
#[command(about = "Play tic-tac-toe in the terminal against an LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// LLM provider
    #[arg(long, value_enum, global = true)]
    pub provider: Option<LlmProvider>,

    /// Model identifier
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Mark played by the human (X moves first)
    #[arg(long, value_parser = parse_player, global = true)]
    pub human: Option<Player>,

    /// Log file used while the game is on screen
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to run (defaults to play)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Play a game in the terminal
    Play,

    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    /// Config path to load: the flag, or the default file if it exists.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        })
    }

    /// Applies command-line overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(provider) = self.provider {
            config.set_provider(provider);
        }
        if let Some(model) = &self.model {
            config.set_model(model.clone());
        }
        if let Some(human) = self.human {
            config.set_human(human);
        }
        if let Some(log_file) = &self.log_file {
            config.set_log_file(log_file.clone());
        }
    }
}

fn parse_player(s: &str) -> Result<Player, String> {
    Player::from_mark(s).ok_or_else(|| format!("expected X or O, got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::parse_from(["tictactoe_llm"]);
        assert_eq!(cli.command, None);
        assert!(cli.model.is_none());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "tictactoe_llm",
            "play",
            "--provider",
            "anthropic",
            "--model",
            "claude-test",
            "--human",
            "o",
        ]);
        assert_eq!(cli.command, Some(Command::Play));

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(*config.provider(), LlmProvider::Anthropic);
        assert_eq!(config.model(), "claude-test");
        assert_eq!(*config.human(), Player::O);
    }

    #[test]
    fn test_rejects_unknown_mark() {
        assert!(Cli::try_parse_from(["tictactoe_llm", "--human", "z"]).is_err());
    }
}
