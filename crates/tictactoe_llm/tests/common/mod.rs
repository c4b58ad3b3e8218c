//! Scripted transports for driving the client and engine without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tictactoe_llm::{
    CompletionClient, CompletionRequest, CompletionSettings, CompletionTransport, Engine,
    EngineSettings, RetryPolicy, TransportError, TransportReply,
};

/// Replays a fixed list of outcomes, one per call, and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportReply, TransportError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<TransportReply, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every call answers with the given texts, in order.
    pub fn replying(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok(reply(t))).collect())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn send(&self, request: &CompletionRequest) -> Result<TransportReply, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::request("script exhausted")))
    }
}

/// Never answers.
#[derive(Debug, Default)]
pub struct HangingTransport {
    calls: Mutex<usize>,
}

impl HangingTransport {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CompletionTransport for HangingTransport {
    async fn send(&self, _request: &CompletionRequest) -> Result<TransportReply, TransportError> {
        *self.calls.lock().unwrap() += 1;
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(TransportError::request("unreachable"))
    }
}

pub fn reply(text: &str) -> TransportReply {
    TransportReply::new(Some(text.to_string()), "stop")
}

pub fn failure() -> Result<TransportReply, TransportError> {
    Err(TransportError::request("connection refused"))
}

/// Single attempt, no backoff: one scripted entry per opponent turn.
pub fn one_shot() -> RetryPolicy {
    RetryPolicy::default()
        .with_max_attempts(1)
        .with_backoff_step(Duration::ZERO)
}

pub fn client(transport: Arc<dyn CompletionTransport>, retry: RetryPolicy) -> CompletionClient {
    CompletionClient::new(transport, CompletionSettings::default(), retry)
}

pub fn engine(transport: Arc<dyn CompletionTransport>, settings: EngineSettings) -> Engine {
    Engine::new(client(transport, one_shot()), settings)
}
