//! Completion Service Port - interface to the external text-generation
//! capability.
//!
//! The assistance layer hands over a prompt and a response-length cap and
//! gets back generated text plus token accounting. The contract is
//! deliberately non-streaming: assistance replies are one short sentence,
//! and every failure mode ends in the deterministic fallback anyway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request for a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions that frame the reply.
    pub system: Option<String>,
    /// The user-facing prompt.
    pub prompt: String,
    /// Hard cap on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature; `None` uses the provider default.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Creates a request with the given prompt and length cap.
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens,
            temperature: None,
        }
    }

    /// Sets the system instructions.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token usage and cost accounting for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
    /// Estimated cost in cents.
    pub estimated_cost_cents: u32,
}

impl TokenUsage {
    /// Creates usage accounting.
    pub fn new(prompt_tokens: u32, completion_tokens: u32, cost_cents: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            estimated_cost_cents: cost_cents,
        }
    }

    /// Zero usage, as reported by fallback turns.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// A completed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReply {
    /// The generated text.
    pub text: String,
    /// Token accounting for the call.
    pub usage: TokenUsage,
}

/// Completion service failures.
///
/// All of these are recovered locally by the assistance layer's fallback;
/// none reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CompletionError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if retrying could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Unavailable { .. }
                | Self::Network(_)
                | Self::Timeout { .. }
        )
    }
}

/// Port for the pluggable text-generation capability.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Generates a completion for the request.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, CompletionError>;

    /// Provider name, for logs and usage attribution.
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_works() {
        let request = CompletionRequest::new("extract the feeling", 40)
            .with_system("You are terse.")
            .with_temperature(0.2);

        assert_eq!(request.prompt, "extract the feeling");
        assert_eq!(request.max_tokens, 40);
        assert_eq!(request.system.as_deref(), Some("You are terse."));
        assert_eq!(request.temperature, Some(0.2));
    }

    #[test]
    fn token_usage_calculates_total() {
        let usage = TokenUsage::new(100, 20, 3);
        assert_eq!(usage.total_tokens, 120);
        assert_eq!(usage.estimated_cost_cents, 3);
    }

    #[test]
    fn token_usage_zero_is_empty() {
        let usage = TokenUsage::zero();
        assert_eq!(usage.total_tokens, 0);
        assert_eq!(usage.estimated_cost_cents, 0);
    }

    #[test]
    fn retryable_classification() {
        assert!(CompletionError::RateLimited { retry_after_secs: 5 }.is_retryable());
        assert!(CompletionError::unavailable("down").is_retryable());
        assert!(CompletionError::network("reset").is_retryable());
        assert!(CompletionError::Timeout { timeout_secs: 10 }.is_retryable());

        assert!(!CompletionError::AuthenticationFailed.is_retryable());
        assert!(!CompletionError::parse("bad json").is_retryable());
        assert!(!CompletionError::InvalidRequest("empty".into()).is_retryable());
    }

    #[test]
    fn errors_display_correctly() {
        assert_eq!(
            CompletionError::Timeout { timeout_secs: 10 }.to_string(),
            "request timed out after 10s"
        );
        assert_eq!(
            CompletionError::RateLimited { retry_after_secs: 30 }.to_string(),
            "rate limited: retry after 30s"
        );
    }
}
