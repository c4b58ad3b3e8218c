//! Application configuration.
//!
//! Defaults, overridden by a TOML file, overridden by the environment.
//! Command-line flags are applied on top by the binary.

use crate::completion::{CompletionSettings, LlmConfig, LlmProvider, RetryPolicy};
use crate::engine::{EngineSettings, TerminalPolicy};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tictactoe_rules::Player;
use tracing::{debug, info, instrument};

/// Environment variable that overrides the model, e.g. with a fine-tuned one.
pub const MODEL_ENV: &str = "FINE_TUNED_MODEL";

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// LLM provider (openai or anthropic).
    provider: LlmProvider,

    /// Model identifier.
    model: String,

    /// Optional API base URL (OpenAI-compatible servers, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    api_base: Option<String>,

    /// Sampling temperature.
    temperature: f64,

    /// Maximum tokens per reply.
    max_tokens: u32,

    /// Per-attempt timeout in seconds.
    timeout_secs: u64,

    /// Attempts per opponent turn.
    max_attempts: u32,

    /// Backoff unit in milliseconds.
    backoff_ms: u64,

    /// Handling of game ends declared by the opponent.
    terminal_policy: TerminalPolicy,

    /// Mark played by the human.
    human: Player,

    /// Where logs go while the terminal UI owns the screen.
    log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        let settings = CompletionSettings::default();
        Self {
            provider: LlmProvider::OpenAI,
            model: settings.model().clone(),
            api_base: None,
            temperature: 0.7,
            max_tokens: *settings.max_tokens(),
            timeout_secs: retry.timeout().as_secs(),
            max_attempts: *retry.max_attempts(),
            backoff_ms: u64::try_from(retry.backoff_step().as_millis()).unwrap_or(1000),
            terminal_policy: TerminalPolicy::default(),
            human: Player::X,
            log_file: PathBuf::from("tictactoe_llm.log"),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file. Missing keys keep their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(provider = %config.provider, model = %config.model, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given, otherwise uses defaults; then applies the environment.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies environment overrides read through `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            debug!(model = %model, "Model overridden from environment");
            self.model = model;
        }
        self
    }

    /// Overrides the provider.
    pub fn set_provider(&mut self, provider: LlmProvider) {
        self.provider = provider;
    }

    /// Overrides the model.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Overrides the human's mark.
    pub fn set_human(&mut self, human: Player) {
        self.human = human;
    }

    /// Overrides the log file.
    pub fn set_log_file(&mut self, log_file: PathBuf) {
        self.log_file = log_file;
    }

    /// Model parameters for the completion client.
    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings::default()
            .with_model(self.model.clone())
            .with_temperature(self.temperature as f32)
            .with_max_tokens(self.max_tokens)
    }

    /// Retry policy for the completion client.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_backoff_step(Duration::from_millis(self.backoff_ms))
    }

    /// Engine settings.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings::default()
            .with_human(self.human)
            .with_terminal_policy(self.terminal_policy)
    }

    /// Creates LLM configuration from this config.
    /// Requires OPENAI_API_KEY or ANTHROPIC_API_KEY environment variable.
    #[instrument(skip(self), fields(provider = %self.provider))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        self.llm_config_from(|key| std::env::var(key).ok())
    }

    /// Like [`create_llm_config`](Self::create_llm_config), reading through `lookup`.
    pub fn llm_config_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<LlmConfig, ConfigError> {
        let var = match self.provider {
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        };
        let api_key = lookup(var)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::new(format!("{} environment variable not set", var)))?;

        Ok(LlmConfig::new(self.provider, api_key, self.api_base.clone()))
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
