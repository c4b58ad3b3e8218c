//! Retry, timeout and backoff behavior of the completion client.

mod common;

use common::{HangingTransport, ScriptedTransport, client, failure, reply};
use std::sync::Arc;
use std::time::Duration;
use tictactoe_llm::{ChatMessage, CompletionError, RetryPolicy, Role, TransportReply};
use tokio::time::Instant;

fn prompt() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are a Tic Tac Toe AI player."),
        ChatMessage::user("What's your next move?"),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_returns_text_verbatim() {
    let transport = ScriptedTransport::replying(&["  {\"row\": 1, \"col\": 1}\n"]);
    let client = client(transport.clone(), RetryPolicy::default());

    let start = Instant::now();
    let text = client.complete(prompt()).await.unwrap();

    assert_eq!(text, "  {\"row\": 1, \"col\": 1}\n");
    assert_eq!(transport.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_request_carries_prompt_and_settings() {
    let transport = ScriptedTransport::replying(&["ok"]);
    let client = client(transport.clone(), RetryPolicy::default());

    client.complete(prompt()).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model, "gpt-4o-mini-2024-07-18");
    assert_eq!(request.max_tokens, 50);
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, Role::System);
    assert_eq!(request.messages[1].role, Role::User);
}

#[tokio::test(start_paused = true)]
async fn test_two_failures_then_success_waits_linear_backoff() {
    let transport = ScriptedTransport::new(vec![failure(), failure(), Ok(reply("{\"row\":0,\"col\":0}"))]);
    let client = client(transport.clone(), RetryPolicy::default());

    let start = Instant::now();
    let text = client.complete(prompt()).await.unwrap();

    assert_eq!(text, "{\"row\":0,\"col\":0}");
    assert_eq!(transport.calls(), 3);
    // 1s after the first failure, 2s after the second.
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_report_attempts_and_last_cause() {
    let transport = ScriptedTransport::new(vec![failure(), failure(), failure(), Ok(reply("late"))]);
    let client = client(transport.clone(), RetryPolicy::default());

    let start = Instant::now();
    let err = client.complete(prompt()).await.unwrap_err();

    match err {
        CompletionError::ExchangeFailed { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(!source.is_timeout());
        }
        other => panic!("expected ExchangeFailed, got {other:?}"),
    }
    assert_eq!(transport.calls(), 3);
    // No wait after the final attempt.
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_hanging_service_times_out_every_attempt() {
    let transport = Arc::new(HangingTransport::default());
    let client = client(transport.clone(), RetryPolicy::default());

    let start = Instant::now();
    let err = client.complete(prompt()).await.unwrap_err();

    match err {
        CompletionError::ExchangeFailed { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(source.is_timeout());
        }
        other => panic!("expected ExchangeFailed, got {other:?}"),
    }
    assert_eq!(transport.calls(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(10 * 3 + 1 + 2));
}

#[tokio::test(start_paused = true)]
async fn test_custom_policy() {
    let transport = ScriptedTransport::new(vec![failure(), Ok(reply("done"))]);
    let retry = RetryPolicy::default()
        .with_max_attempts(2)
        .with_backoff_step(Duration::from_millis(250));
    let client = client(transport.clone(), retry);

    let start = Instant::now();
    assert_eq!(client.complete(prompt()).await.unwrap(), "done");
    assert_eq!(start.elapsed(), Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn test_zero_attempts_still_tries_once() {
    let transport = ScriptedTransport::new(vec![failure()]);
    let client = client(transport.clone(), RetryPolicy::default().with_max_attempts(0));

    let err = client.complete(prompt()).await.unwrap_err();
    assert!(matches!(err, CompletionError::ExchangeFailed { attempts: 1, .. }));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_missing_content_is_empty_text() {
    let transport = ScriptedTransport::new(vec![Ok(TransportReply::new(None, "length"))]);
    let client = client(transport, RetryPolicy::default());

    assert_eq!(client.complete(prompt()).await.unwrap(), "");
}

#[tokio::test]
async fn test_empty_prompt_is_rejected_without_a_call() {
    let transport = ScriptedTransport::replying(&["unused"]);
    let client = client(transport.clone(), RetryPolicy::default());

    let err = client.complete(Vec::new()).await.unwrap_err();
    assert!(matches!(err, CompletionError::EmptyPrompt));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_backoff_is_linear() {
    let retry = RetryPolicy::default();
    assert_eq!(retry.backoff_after(1), Duration::from_secs(1));
    assert_eq!(retry.backoff_after(2), Duration::from_secs(2));
}
