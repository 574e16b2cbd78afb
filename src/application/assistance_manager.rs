//! AI Assistance Manager - budgeted completion calls with a deterministic
//! fallback.
//!
//! Two intervention paths share one budget: trigger-based assistance
//! (a step flags the input as stuck/bundled/verbose) and linguistic
//! interpretation (naturalizing an echo template). Every invocation counts
//! against the session before the completion call is attempted, and every
//! failure mode - error, timeout, exhausted budget - degrades to the exact
//! deterministic text with zero token count and zero cost. Assistance never
//! errors and never stalls a session.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AiConfig;
use crate::domain::assistance::interpreter;
use crate::domain::assistance::trigger::{build_assist_prompt, AiTriggerRule, AssistAction};
use crate::domain::assistance::{BudgetLimits, UsageLedger, SIMPLIFY_SENTENCE};
use crate::domain::foundation::SessionId;
use crate::domain::protocol::ExpectedResponse;
use crate::ports::{CompletionError, CompletionReply, CompletionRequest, CompletionService, TokenUsage};

/// Tunables for the assistance layer.
#[derive(Debug, Clone)]
pub struct AssistanceSettings {
    /// Per-session budget ceilings.
    pub limits: BudgetLimits,
    /// Completion call timeout.
    pub timeout: Duration,
    /// Length cap for assistance replies, in tokens.
    pub max_reply_tokens: u32,
}

impl From<&AiConfig> for AssistanceSettings {
    fn from(config: &AiConfig) -> Self {
        Self {
            limits: config.limits(),
            timeout: config.timeout(),
            max_reply_tokens: config.max_reply_tokens,
        }
    }
}

/// The outcome of one assistance invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistOutcome {
    /// The message to deliver.
    pub message: String,
    /// Token accounting; zero on fallback.
    pub usage: TokenUsage,
    /// True when the deterministic fallback was served.
    pub from_fallback: bool,
}

impl AssistOutcome {
    fn fallback(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            usage: TokenUsage::zero(),
            from_fallback: true,
        }
    }
}

/// Budgeted bridge between the protocol and the completion service.
pub struct AssistanceManager {
    completion: Arc<dyn CompletionService>,
    ledger: Arc<dyn UsageLedger>,
    settings: AssistanceSettings,
}

impl AssistanceManager {
    /// Creates a manager over the given completion service and ledger.
    pub fn new(
        completion: Arc<dyn CompletionService>,
        ledger: Arc<dyn UsageLedger>,
        settings: AssistanceSettings,
    ) -> Self {
        Self {
            completion,
            ledger,
            settings,
        }
    }

    /// Handles a fired step trigger.
    ///
    /// `scripted_fallback` is the deterministic text for this step; the
    /// `Simplify` action ignores it and falls back to the canonical sentence
    /// verbatim.
    pub async fn assist(
        &self,
        session: &SessionId,
        rule: &AiTriggerRule,
        expected: ExpectedResponse,
        input: &str,
        scripted_fallback: &str,
    ) -> AssistOutcome {
        let fallback = match rule.action {
            AssistAction::Simplify => SIMPLIFY_SENTENCE,
            _ => scripted_fallback,
        };

        if !self
            .ledger
            .begin_call(session, &self.settings.limits)
            .may_proceed()
        {
            tracing::debug!(session_id = %session, "assistance budget exhausted, serving fallback");
            return AssistOutcome::fallback(fallback);
        }

        let request = CompletionRequest::new(
            build_assist_prompt(rule, expected, input),
            self.settings.max_reply_tokens,
        )
        .with_system(rule.action.instruction())
        .with_temperature(0.3);

        match self.call(request).await {
            Ok(reply) if !reply.text.trim().is_empty() => {
                self.record(session, &reply);
                AssistOutcome {
                    message: reply.text,
                    usage: reply.usage,
                    from_fallback: false,
                }
            }
            Ok(_) => {
                tracing::warn!(session_id = %session, "completion returned empty text, serving fallback");
                AssistOutcome::fallback(fallback)
            }
            Err(e) => {
                tracing::warn!(session_id = %session, error = %e, "completion failed, serving fallback");
                AssistOutcome::fallback(fallback)
            }
        }
    }

    /// Naturalizes an echo template for an interpreted step.
    ///
    /// `deterministic` is the engine-rendered text using the user's raw
    /// input; it is returned unmodified on any failure.
    pub async fn naturalize(
        &self,
        session: &SessionId,
        step_id: &str,
        raw_input: &str,
        deterministic: &str,
    ) -> AssistOutcome {
        if !interpreter::is_interpreted(step_id) {
            return AssistOutcome::fallback(deterministic);
        }

        if !self
            .ledger
            .begin_call(session, &self.settings.limits)
            .may_proceed()
        {
            tracing::debug!(session_id = %session, "assistance budget exhausted, keeping template");
            return AssistOutcome::fallback(deterministic);
        }

        let request = CompletionRequest::new(
            interpreter::build_extraction_prompt(raw_input),
            self.settings.max_reply_tokens,
        )
        .with_system("You extract the single core feeling from user text. Reply with the word only.")
        .with_temperature(0.0);

        match self.call(request).await {
            Ok(reply) => {
                let naturalized = interpreter::sanitize_token(&reply.text)
                    .and_then(|token| interpreter::naturalized(step_id, &token));
                match naturalized {
                    Some(message) => {
                        self.record(session, &reply);
                        AssistOutcome {
                            message,
                            usage: reply.usage,
                            from_fallback: false,
                        }
                    }
                    None => {
                        tracing::warn!(
                            session_id = %session,
                            step_id,
                            "extraction produced no usable token, keeping template"
                        );
                        AssistOutcome::fallback(deterministic)
                    }
                }
            }
            Err(e) => {
                tracing::warn!(session_id = %session, error = %e, "extraction failed, keeping template");
                AssistOutcome::fallback(deterministic)
            }
        }
    }

    /// Awaits the completion with the configured timeout.
    async fn call(&self, request: CompletionRequest) -> Result<CompletionReply, CompletionError> {
        match tokio::time::timeout(self.settings.timeout, self.completion.complete(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout {
                timeout_secs: self.settings.timeout.as_secs() as u32,
            }),
        }
    }

    fn record(&self, session: &SessionId, reply: &CompletionReply) {
        self.ledger.record(
            session,
            reply.usage.total_tokens,
            reply.usage.estimated_cost_cents,
        );
    }
}
