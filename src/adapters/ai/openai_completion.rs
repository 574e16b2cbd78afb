//! OpenAI-compatible completion adapter.
//!
//! Talks to any chat-completions endpoint that speaks the OpenAI wire
//! format. Non-streaming only: assistance replies are one short sentence.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    CompletionError, CompletionReply, CompletionRequest, CompletionService, TokenUsage,
};

/// Configuration for the OpenAI-compatible adapter.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    api_key: Secret<String>,
    /// Model to use (e.g. "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Flat cost estimate in cents per 1000 tokens.
    pub cost_cents_per_1k_tokens: f64,
}

impl OpenAiConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(10),
            cost_cents_per_1k_tokens: 1.0,
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the flat cost estimate in cents per 1000 tokens.
    pub fn with_cost_cents_per_1k_tokens(mut self, cents: f64) -> Self {
        self.cost_cents_per_1k_tokens = cents;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiCompletionService {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiCompletionService {
    /// Creates the service with the given configuration.
    pub fn new(config: OpenAiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_wire_request(&self, request: &CompletionRequest) -> WireRequest {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(WireMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });
        WireRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn estimate_cost_cents(&self, total_tokens: u32) -> u32 {
        let cents = f64::from(total_tokens) * self.config.cost_cents_per_1k_tokens / 1000.0;
        cents.ceil() as u32
    }

    fn map_status(status: reqwest::StatusCode, body: &str) -> CompletionError {
        match status.as_u16() {
            401 | 403 => CompletionError::AuthenticationFailed,
            429 => CompletionError::RateLimited {
                retry_after_secs: 30,
            },
            500..=599 => CompletionError::unavailable(format!("status {status}: {body}")),
            _ => CompletionError::InvalidRequest(format!("status {status}: {body}")),
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionReply, CompletionError> {
        let wire = self.to_wire_request(&request);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&wire)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else {
                    CompletionError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, &body));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::parse(e.to_string()))?;

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::parse("response carried no choices"))?;
        let usage = wire.usage.unwrap_or_default();

        Ok(CompletionReply {
            text: choice.message.content.trim().to_string(),
            usage: TokenUsage::new(
                usage.prompt_tokens,
                usage.completion_tokens,
                self.estimate_cost_cents(usage.prompt_tokens + usage.completion_tokens),
            ),
        })
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}
