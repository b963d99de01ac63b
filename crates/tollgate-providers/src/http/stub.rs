//! Scripted upstream transport
//!
//! Replays queued replies in order and records every request it receives.
//! With an empty queue it answers `200` with a small JSON echo of the
//! request, which is what stub mode serves.

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tollgate_domain::error::{Error, Result};
use tollgate_domain::ports::UpstreamTransport;
use tollgate_domain::value_objects::{UpstreamRequest, UpstreamResponse};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Return this response
    Respond(UpstreamResponse),
    /// Fail at the transport level with this message
    Fail(String),
    /// Sleep, then return the response
    Delay(Duration, UpstreamResponse),
}

/// Scripted transport for stub mode and tests
#[derive(Debug, Default)]
pub struct StubTransport {
    replies: Mutex<VecDeque<StubReply>>,
    requests: Mutex<Vec<UpstreamRequest>>,
    simulated: bool,
}

impl StubTransport {
    /// Transport that reports itself as a simulated upstream
    pub fn new() -> Self {
        Self {
            simulated: true,
            ..Self::default()
        }
    }

    /// Transport that behaves like a real upstream for orchestration purposes
    pub fn scripted() -> Self {
        Self::default()
    }

    /// Queue a reply
    pub fn push(&self, reply: StubReply) -> &Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Queue a response
    pub fn respond(&self, response: UpstreamResponse) -> &Self {
        self.push(StubReply::Respond(response))
    }

    /// Number of requests received
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        lock(&self.requests).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl UpstreamTransport for StubTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse> {
        let reply = lock(&self.replies).pop_front();
        let echo = json!({
            "stub": true,
            "method": request.method.as_str(),
            "url": request.url,
        });
        lock(&self.requests).push(request);

        match reply {
            None => Ok(UpstreamResponse::ok(echo)),
            Some(StubReply::Respond(response)) => Ok(response),
            Some(StubReply::Fail(message)) => Err(Error::network(message)),
            Some(StubReply::Delay(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
        }
    }

    fn is_stub(&self) -> bool {
        self.simulated
    }
}
