//! AI assistance configuration.

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::assistance::BudgetLimits;

/// Configuration for the AI assistance layer.
///
/// The budget ceilings are fixed per deployment: once a session crosses
/// either one, every further assistance request is served by the
/// deterministic fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Completion service API key. Absent means the deployment runs
    /// fallback-only.
    pub api_key: Option<Secret<String>>,

    /// Model to request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the completion endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Completion call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Length cap for assistance replies, in tokens.
    #[serde(default = "default_max_reply_tokens")]
    pub max_reply_tokens: u32,

    /// Maximum assistance invocations per session.
    #[serde(default = "default_max_calls_per_session")]
    pub max_calls_per_session: u32,

    /// Maximum accumulated assistance cost per session, in cents.
    #[serde(default = "default_max_session_cost_cents")]
    pub max_session_cost_cents: u32,

    /// Flat cost estimate in cents per 1000 tokens.
    #[serde(default = "default_cost_cents_per_1k_tokens")]
    pub cost_cents_per_1k_tokens: f64,
}

impl AiConfig {
    /// Timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The per-session budget ceilings.
    pub fn limits(&self) -> BudgetLimits {
        BudgetLimits {
            max_calls: self.max_calls_per_session,
            max_cost_cents: self.max_session_cost_cents,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "ai.timeout_secs",
                reason: "must be positive".into(),
            });
        }
        if self.max_reply_tokens == 0 {
            return Err(ValidationError::InvalidValue {
                field: "ai.max_reply_tokens",
                reason: "must be positive".into(),
            });
        }
        if self.max_calls_per_session == 0 {
            return Err(ValidationError::InvalidValue {
                field: "ai.max_calls_per_session",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_reply_tokens: default_max_reply_tokens(),
            max_calls_per_session: default_max_calls_per_session(),
            max_session_cost_cents: default_max_session_cost_cents(),
            cost_cents_per_1k_tokens: default_cost_cents_per_1k_tokens(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_reply_tokens() -> u32 {
    60
}

fn default_max_calls_per_session() -> u32 {
    12
}

fn default_max_session_cost_cents() -> u32 {
    50
}

fn default_cost_cents_per_1k_tokens() -> f64 {
    1.0
}
