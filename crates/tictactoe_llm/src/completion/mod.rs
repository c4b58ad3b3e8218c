//! Text-completion exchange: message types, the transport seam, the
//! retrying client, and the provider transports.

mod anthropic;
mod client;
mod error;
mod openai;

pub use anthropic::AnthropicTransport;
pub use client::{CompletionClient, CompletionSettings, RetryPolicy};
pub use error::{CompletionError, TransportError, TransportErrorKind};
pub use openai::OpenAiTransport;

use derive_new::new;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Role of a prompt segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    #[display("system")]
    System,
    /// Content from the player side.
    #[display("user")]
    User,
    /// Earlier model output.
    #[display("assistant")]
    Assistant,
}

/// One role-tagged prompt segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: Role,
    /// Segment text.
    #[new(into)]
    pub content: String,
}

impl ChatMessage {
    /// A system segment.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// A user segment.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Everything one outbound call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Ordered prompt segments.
    pub messages: Vec<ChatMessage>,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion length cap.
    pub max_tokens: u32,
}

/// What a transport hands back from a successful call.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TransportReply {
    /// Generated text; `None` when the service returned no content.
    pub text: Option<String>,
    /// Provider-specific completion status (finish or stop reason).
    #[new(into)]
    pub raw_status: String,
}

/// Outbound completion capability.
///
/// Implementations perform exactly one network call per `send`; timeouts and
/// retries belong to [`CompletionClient`].
#[async_trait::async_trait]
pub trait CompletionTransport: Send + Sync + std::fmt::Debug {
    /// Sends one request and returns the raw reply.
    async fn send(&self, request: &CompletionRequest) -> Result<TransportReply, TransportError>;
}

/// LLM provider selection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI (GPT models) or any OpenAI-compatible server.
    #[display("openai")]
    #[value(name = "openai")]
    OpenAI,
    /// Anthropic (Claude models).
    #[display("anthropic")]
    Anthropic,
}

/// Provider credentials and endpoint.
#[derive(Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    api_base: Option<String>,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = %provider))]
    pub fn new(provider: LlmProvider, api_key: String, api_base: Option<String>) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            api_base,
        }
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Gets the API base URL override.
    pub fn api_base(&self) -> Option<&str> {
        self.api_base.as_deref()
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Builds the transport for the configured provider.
#[instrument(skip(config), fields(provider = %config.provider()))]
pub fn build_transport(config: &LlmConfig) -> Arc<dyn CompletionTransport> {
    info!("Building completion transport");
    match config.provider() {
        LlmProvider::OpenAI => Arc::new(OpenAiTransport::new(config)),
        LlmProvider::Anthropic => Arc::new(AnthropicTransport::new(config)),
    }
}
