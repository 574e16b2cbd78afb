//! Mock completion service for testing.
//!
//! Queued replies are consumed in order; an empty queue reports the provider
//! as unavailable, which exercises the deterministic fallback. Every request
//! is captured for verification.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    CompletionError, CompletionReply, CompletionRequest, CompletionService, TokenUsage,
};

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return text with the given usage.
    Success { text: String, usage: TokenUsage },
    /// Fail with a timeout.
    Timeout,
    /// Fail as unavailable.
    Unavailable,
    /// Fail with a rate limit.
    RateLimited,
}

/// Scriptable mock implementation of the completion service.
#[derive(Clone, Default)]
pub struct MockCompletionService {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
}

impl MockCompletionService {
    /// Creates a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply with default usage (10 prompt tokens,
    /// 5 completion tokens, 1 cent).
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.with_reply_usage(text, TokenUsage::new(10, 5, 1))
    }

    /// Queues a successful reply with explicit usage.
    pub fn with_reply_usage(self, text: impl Into<String>, usage: TokenUsage) -> Self {
        self.replies.lock().unwrap().push_back(MockReply::Success {
            text: text.into(),
            usage,
        });
        self
    }

    /// Queues an error reply.
    pub fn with_error(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Adds a fixed latency to every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All captured requests, in call order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionReply, CompletionError> {
        self.calls.lock().unwrap().push(request);

        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(MockReply::Success { text, usage }) => Ok(CompletionReply { text, usage }),
            Some(MockReply::Timeout) => Err(CompletionError::Timeout { timeout_secs: 0 }),
            Some(MockReply::Unavailable) => {
                Err(CompletionError::unavailable("mock scripted outage"))
            }
            Some(MockReply::RateLimited) => Err(CompletionError::RateLimited {
                retry_after_secs: 1,
            }),
            None => Err(CompletionError::unavailable("mock script exhausted")),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
