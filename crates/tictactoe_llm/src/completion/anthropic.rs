//! Anthropic Messages API transport.

use super::{
    CompletionRequest, CompletionTransport, LlmConfig, Role, TransportError, TransportErrorKind,
    TransportReply,
};
use tracing::{debug, error, instrument};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Transport backed by the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicTransport {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for AnthropicTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicTransport")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl AnthropicTransport {
    /// Creates a transport from provider credentials.
    #[instrument(skip(config))]
    pub fn new(config: &LlmConfig) -> Self {
        let base = config.api_base().unwrap_or(DEFAULT_API_BASE);
        let endpoint = format!("{}/v1/messages", base.trim_end_matches('/'));
        debug!(endpoint = %endpoint, "Creating Anthropic client");
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key().to_string(),
            endpoint,
        }
    }

    /// Request body: system segments are joined into `system`, the rest
    /// become `messages` in order.
    fn body(request: &CompletionRequest) -> serde_json::Value {
        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| serde_json::json!({ "role": m.role, "content": m.content }))
            .collect();

        let mut body = serde_json::json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": messages,
        });
        if !system.is_empty() {
            body["system"] = serde_json::Value::String(system.join("\n\n"));
        }
        body
    }
}

#[async_trait::async_trait]
impl CompletionTransport for AnthropicTransport {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn send(&self, request: &CompletionRequest) -> Result<TransportReply, TransportError> {
        debug!("Sending request to Anthropic");
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&Self::body(request))
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                TransportError::request(format!("Anthropic API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Anthropic response");
            TransportError::request(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Anthropic API error");
            return Err(TransportError::new(TransportErrorKind::Status {
                status: status.as_u16(),
                body: response_text,
            }));
        }

        let response_json: serde_json::Value =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = ?e, response = %response_text, "Failed to parse Anthropic response");
                TransportError::new(TransportErrorKind::Decode(e.to_string()))
            })?;

        let text = response_json["content"]
            .as_array()
            .and_then(|blocks| blocks.iter().find_map(|block| block["text"].as_str()))
            .map(str::to_string);
        let raw_status = response_json["stop_reason"]
            .as_str()
            .unwrap_or("unknown")
            .to_string();

        debug!(status = %raw_status, has_content = text.is_some(), "Anthropic response received");
        Ok(TransportReply::new(text, raw_status))
    }
}
