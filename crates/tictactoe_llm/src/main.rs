//! tictactoe_llm - terminal tic-tac-toe against a language model.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use tictactoe_llm::{AppConfig, CompletionClient, Engine, build_transport, tui};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config_path().as_deref())
        .context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => run_play(config).await,
        Command::Config => show_config(&config),
    }
}

/// Run the game, logging to the configured file so the screen stays clean
async fn run_play(config: AppConfig) -> Result<()> {
    let log_file = std::fs::File::create(config.log_file()).with_context(|| {
        format!("Failed to create log file {}", config.log_file().display())
    })?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(provider = %config.provider(), model = %config.model(), "Starting game");

    let llm_config = config
        .create_llm_config()
        .context("Missing API credentials")?;
    let transport = build_transport(&llm_config);
    let client = CompletionClient::new(
        transport,
        config.completion_settings(),
        config.retry_policy(),
    );
    let engine = Engine::new(client, config.engine_settings());

    tui::run(engine).await
}

/// Print the effective configuration
fn show_config(config: &AppConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    print!("{}", config.to_toml().context("Failed to render configuration")?);
    Ok(())
}
