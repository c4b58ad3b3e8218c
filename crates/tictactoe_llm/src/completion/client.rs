//! Retrying completion client.

use super::{
    ChatMessage, CompletionError, CompletionRequest, CompletionTransport, TransportError,
    TransportErrorKind,
};
use derive_getters::Getters;
use derive_setters::Setters;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// How hard to try before giving up on an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    max_attempts: u32,
    /// Per-attempt time limit.
    timeout: Duration,
    /// Backoff unit; the wait after attempt `n` is `n * backoff_step`.
    backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(10),
            backoff_step: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt that follows `attempt`.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

/// Model parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct CompletionSettings {
    /// Model identifier.
    #[setters(into)]
    model: String,
    /// Sampling temperature.
    temperature: f32,
    /// Completion length cap.
    max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini-2024-07-18".to_string(),
            temperature: 0.7,
            max_tokens: 50,
        }
    }
}

/// Performs one logical exchange with a completion service.
///
/// The client holds no per-call state: every [`complete`](Self::complete)
/// call is independent, and a failed exchange leaves nothing behind.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    transport: Arc<dyn CompletionTransport>,
    settings: CompletionSettings,
    retry: RetryPolicy,
}

impl CompletionClient {
    /// Creates a client over the given transport.
    #[instrument(skip(transport))]
    pub fn new(
        transport: Arc<dyn CompletionTransport>,
        settings: CompletionSettings,
        retry: RetryPolicy,
    ) -> Self {
        info!("Creating completion client");
        Self {
            transport,
            settings,
            retry,
        }
    }

    /// Sends `messages` and returns the reply text verbatim.
    ///
    /// Each attempt runs under the policy timeout. A timed-out or failed
    /// attempt is retried after `attempt * backoff_step` until
    /// `max_attempts` is reached; there is no wait after the last attempt.
    ///
    /// # Errors
    ///
    /// `EmptyPrompt` for an empty message list; `ExchangeFailed` with the
    /// final cause once every attempt has failed.
    #[instrument(skip(self, messages), fields(model = %self.settings.model, segments = messages.len()))]
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, CompletionError> {
        if messages.is_empty() {
            return Err(CompletionError::EmptyPrompt);
        }

        let request = CompletionRequest {
            messages,
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, "Sending completion request");
            match tokio::time::timeout(self.retry.timeout, self.transport.send(&request)).await {
                Ok(Ok(reply)) => {
                    let text = reply.text.unwrap_or_default();
                    info!(
                        attempt,
                        status = %reply.raw_status,
                        content_length = text.len(),
                        "Completion received"
                    );
                    return Ok(text);
                }
                Ok(Err(e)) => {
                    warn!(attempt, error = %e, "Completion attempt failed");
                    last_error = Some(e);
                }
                Err(_) => {
                    warn!(attempt, timeout = ?self.retry.timeout, "Completion attempt timed out");
                    last_error = Some(TransportError::new(TransportErrorKind::Timeout(
                        self.retry.timeout,
                    )));
                }
            }

            if attempt < max_attempts {
                let wait = self.retry.backoff_after(attempt);
                debug!(attempt, wait = ?wait, "Backing off before retry");
                tokio::time::sleep(wait).await;
            }
        }

        let source = last_error
            .unwrap_or_else(|| TransportError::request("no attempt was made"));
        error!(attempts = max_attempts, error = %source, "Max retries reached");
        Err(CompletionError::ExchangeFailed {
            attempts: max_attempts,
            source,
        })
    }
}
