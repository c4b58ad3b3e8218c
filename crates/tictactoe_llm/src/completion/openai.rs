//! OpenAI chat-completions transport.

use super::{
    ChatMessage, CompletionRequest, CompletionTransport, LlmConfig, Role, TransportError,
    TransportReply,
};
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use tracing::{debug, error, instrument};

/// Transport backed by the OpenAI chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiTransport {
    client: OpenAIClient<OpenAIConfig>,
}

impl OpenAiTransport {
    /// Creates a transport from provider credentials.
    #[instrument(skip(config))]
    pub fn new(config: &LlmConfig) -> Self {
        debug!("Creating OpenAI client");
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key());
        if let Some(base) = config.api_base() {
            debug!(api_base = %base, "Using custom API base");
            openai_config = openai_config.with_api_base(base);
        }
        Self {
            client: OpenAIClient::with_config(openai_config),
        }
    }
}

#[track_caller]
fn build_error(what: &str, e: OpenAIError) -> TransportError {
    error!(error = ?e, "Failed to build {}", what);
    TransportError::request(format!("Failed to build {}: {}", what, e))
}

fn to_openai_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, TransportError> {
    let content = message.content.as_str();
    let built = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map(ChatCompletionRequestMessage::System)
            .map_err(|e| build_error("system message", e))?,
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map(ChatCompletionRequestMessage::User)
            .map_err(|e| build_error("user message", e))?,
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map(ChatCompletionRequestMessage::Assistant)
            .map_err(|e| build_error("assistant message", e))?,
    };
    Ok(built)
}

#[async_trait::async_trait]
impl CompletionTransport for OpenAiTransport {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn send(&self, request: &CompletionRequest) -> Result<TransportReply, TransportError> {
        debug!("Building chat completion request");
        let messages = request
            .messages
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>, _>>()?;

        let openai_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_completion_tokens(request.max_tokens)
            .build()
            .map_err(|e| build_error("request", e))?;

        debug!("Sending request to OpenAI");
        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| {
                error!(error = ?e, "OpenAI API error");
                TransportError::request(format!("OpenAI API error: {}", e))
            })?;

        let choice = response.choices.first();
        let text = choice.and_then(|choice| choice.message.content.clone());
        let raw_status = choice
            .and_then(|choice| choice.finish_reason.as_ref())
            .map(|reason| format!("{:?}", reason).to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());

        debug!(status = %raw_status, has_content = text.is_some(), "OpenAI response received");
        Ok(TransportReply::new(text, raw_status))
    }
}
