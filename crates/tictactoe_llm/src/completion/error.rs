//! Completion error types.

use derive_more::{Display, Error};
use std::time::Duration;
use tracing::{error, instrument};

/// What went wrong on a single outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TransportErrorKind {
    /// The call did not finish within the per-attempt timeout.
    #[display("timed out after {:?}", _0)]
    Timeout(Duration),
    /// The request could not be built or sent.
    #[display("request failed: {}", _0)]
    Request(String),
    /// The service answered with a non-success status.
    #[display("service returned {}: {}", status, body)]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
    /// The response could not be decoded.
    #[display("could not decode response: {}", _0)]
    Decode(String),
}

/// Failure of one outbound completion call.
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error: {} at {}:{}", kind, file, line)]
pub struct TransportError {
    /// What went wrong.
    pub kind: TransportErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: TransportErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_kind = %kind, "Transport error created");
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for a request failure.
    #[track_caller]
    pub fn request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Request(message.into()))
    }

    /// True if the attempt was cut off by the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, TransportErrorKind::Timeout(_))
    }
}

/// Failure of a whole exchange, after retries.
#[derive(Debug, Clone, Display, Error)]
pub enum CompletionError {
    /// No messages were supplied.
    #[display("Completion prompt is empty")]
    EmptyPrompt,
    /// Every attempt failed; carries the last cause.
    #[display("Exchange failed after {} attempt(s): {}", attempts, source)]
    ExchangeFailed {
        /// Attempts made.
        attempts: u32,
        /// Cause of the final failure.
        source: TransportError,
    },
}
