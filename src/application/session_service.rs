//! Session service - the public `process_user_input` operation.
//!
//! Orchestrates one turn: per-session serialization, load (or create),
//! migration, the trigger check, the engine, linguistic interpretation, and
//! persistence. Store failures are logged and never surfaced; the in-memory
//! result is still returned.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::assistance_manager::{AssistanceManager, AssistanceSettings};
use crate::application::dto::{AssistanceInfo, TurnRequest, TurnResponse};
use crate::config::AiConfig;
use crate::domain::assistance::interpreter;
use crate::domain::assistance::UsageLedger;
use crate::domain::foundation::{IdError, SessionId, UserId};
use crate::domain::protocol::{
    catalog_for, MigrationAdapter, Modality, ProtocolEngine, ProtocolError, RenderCtx,
    SessionContext, TurnOutput,
};
use crate::ports::{CompletionService, SessionStore};

/// Request-ending errors.
///
/// Everything else - validation reprompts, assistance failures, store
/// failures - is handled inside the turn.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed session or user id.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] IdError),

    /// Catalog/version mismatch surfaced by the engine.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// The public entry point for guided-session turns.
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    engine: ProtocolEngine,
    migration: MigrationAdapter,
    assistance: AssistanceManager,
    ledger: Arc<dyn UsageLedger>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionService {
    /// Wires the service from its collaborators.
    pub fn new(
        store: Arc<dyn SessionStore>,
        completion: Arc<dyn CompletionService>,
        ledger: Arc<dyn UsageLedger>,
        ai_config: &AiConfig,
    ) -> Self {
        let assistance = AssistanceManager::new(
            completion,
            Arc::clone(&ledger),
            AssistanceSettings::from(ai_config),
        );
        Self {
            store,
            engine: ProtocolEngine::default(),
            migration: MigrationAdapter::new(),
            assistance,
            ledger,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the engine (custom resolution classifier).
    pub fn with_engine(mut self, engine: ProtocolEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Runs one turn for a session.
    ///
    /// Creates the context on first interaction; concurrent calls for the
    /// same session are serialized on a per-session mutex, so the later
    /// caller waits instead of clobbering the earlier write.
    pub async fn process_user_input(
        &self,
        request: TurnRequest,
    ) -> Result<TurnResponse, ServiceError> {
        let session_id = SessionId::new(request.session_id.as_str())?;
        let user_id = UserId::new(request.user_id.as_str())?;

        let lock = self.lock_for(&session_id).await;
        let _guard = lock.lock().await;

        let mut ctx = self
            .load_or_create(&session_id, &user_id, request.modality)
            .await;

        // Trigger check on the current step, ahead of the scripted path.
        let catalog = catalog_for(ctx.modality);
        let current = catalog.step(ctx.current_step.as_str()).ok_or_else(|| {
            ProtocolError::UnknownStep {
                modality: ctx.modality,
                step: ctx.current_step.clone(),
            }
        })?;
        if !current.is_auto() {
            if let Some(rule) = current.first_matching_trigger(&request.user_input) {
                let rule = *rule;
                tracing::info!(
                    session_id = %session_id,
                    step = current.id(),
                    condition = rule.condition.tag(),
                    "assistance trigger fired"
                );
                let scripted = current.render(&RenderCtx {
                    input: &request.user_input,
                    ctx: &ctx,
                });
                let outcome = self
                    .assistance
                    .assist(&session_id, &rule, current.expected(), &request.user_input, &scripted)
                    .await;
                // State is unchanged: assistance never skips a step.
                return Ok(TurnResponse {
                    message: outcome.message,
                    next_step_id: ctx.current_step.as_str().to_string(),
                    phase_complete: false,
                    error: None,
                    assistance: Some(AssistanceInfo {
                        should_return_to_script: true,
                        token_count: outcome.usage.total_tokens,
                        cost_cents: outcome.usage.estimated_cost_cents,
                    }),
                });
            }
        }

        let consumed_step = if current.is_auto() {
            None
        } else {
            Some((ctx.current_step.clone(), ctx.current_phase))
        };

        let output = self.engine.advance(&mut ctx, &request.user_input)?;

        if let Some(reprompt) = &output.reprompt {
            // Same-step reprompt; nothing changed, nothing to persist.
            return Ok(TurnResponse {
                message: reprompt.clone(),
                next_step_id: output.next_step.as_str().to_string(),
                phase_complete: false,
                error: Some(reprompt.clone()),
                assistance: None,
            });
        }

        self.persist(&ctx).await;
        if let Some((step, phase)) = consumed_step {
            if let Err(e) = self
                .store
                .save_response(&session_id, phase, &step, &request.user_input)
                .await
            {
                tracing::warn!(session_id = %session_id, error = %e, "failed to persist response row");
            }
        }

        let (message, assistance) = self
            .finalize_message(&session_id, &request.user_input, &output)
            .await;

        Ok(TurnResponse {
            message,
            next_step_id: output.next_step.as_str().to_string(),
            phase_complete: output.phase_complete,
            error: None,
            assistance,
        })
    }

    /// Deletes any existing state for the session and starts it over.
    pub async fn start_fresh_session(
        &self,
        session_id: &str,
        user_id: &str,
        modality: Modality,
    ) -> Result<TurnResponse, ServiceError> {
        let session_id = SessionId::new(session_id)?;
        let user_id = UserId::new(user_id)?;

        let lock = self.lock_for(&session_id).await;
        let _guard = lock.lock().await;

        if let Err(e) = self.store.delete(&session_id).await {
            tracing::error!(session_id = %session_id, error = %e, "failed to delete session state");
        }
        self.ledger.reset(&session_id);

        let mut ctx = SessionContext::new(session_id, user_id, modality);
        let output = self.engine.advance(&mut ctx, "")?;
        self.persist(&ctx).await;

        Ok(TurnResponse {
            message: output.message(),
            next_step_id: output.next_step.as_str().to_string(),
            phase_complete: output.phase_complete,
            error: None,
            assistance: None,
        })
    }

    /// Hands out the per-session mutex, creating it on first use.
    async fn lock_for(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(
            locks
                .entry(session_id.as_str().to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Loads and migrates the context, or creates a fresh one.
    async fn load_or_create(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
        modality: Option<Modality>,
    ) -> SessionContext {
        let loaded = match self.store.load(session_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "failed to load context, starting fresh");
                None
            }
        };

        match loaded {
            Some(mut ctx) => {
                let outcome = self.migration.migrate(&mut ctx);
                if outcome.changed {
                    tracing::info!(session_id = %session_id, "migrated legacy session state");
                    self.persist(&ctx).await;
                }
                ctx
            }
            None => SessionContext::new(
                session_id.clone(),
                user_id.clone(),
                modality.unwrap_or_default(),
            ),
        }
    }

    /// Applies linguistic interpretation to the resting segment when it is
    /// eligible, splicing the naturalized text into the joined message.
    async fn finalize_message(
        &self,
        session_id: &SessionId,
        user_input: &str,
        output: &TurnOutput,
    ) -> (String, Option<AssistanceInfo>) {
        let Some(segment) = output.resting_segment() else {
            return (output.message(), None);
        };
        if !interpreter::is_interpreted(segment.step_id.as_str()) || user_input.trim().is_empty() {
            return (output.message(), None);
        }

        let outcome = self
            .assistance
            .naturalize(session_id, segment.step_id.as_str(), user_input, &segment.text)
            .await;

        let mut texts: Vec<String> = output.segments.iter().map(|s| s.text.clone()).collect();
        if let Some(last) = texts.last_mut() {
            *last = outcome.message.clone();
        }

        (
            texts.join("\n\n"),
            Some(AssistanceInfo {
                should_return_to_script: false,
                token_count: outcome.usage.total_tokens,
                cost_cents: outcome.usage.estimated_cost_cents,
            }),
        )
    }

    async fn persist(&self, ctx: &SessionContext) {
        if let Err(e) = self.store.save(ctx).await {
            tracing::error!(
                session_id = %ctx.session_id,
                error = %e,
                "failed to persist session context"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockCompletionService;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::assistance::InMemoryUsageLedger;
    use crate::domain::protocol::Phase;

    fn service_with(mock: MockCompletionService) -> (SessionService, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        let service = SessionService::new(
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Arc::new(mock),
            Arc::new(InMemoryUsageLedger::new()),
            &AiConfig::default(),
        );
        (service, store)
    }

    fn turn(input: &str) -> TurnRequest {
        TurnRequest::new("svc-session", "u-1", input)
    }

    #[tokio::test]
    async fn first_interaction_creates_and_persists_the_session() {
        let (service, store) = service_with(MockCompletionService::new());

        let response = service.process_user_input(turn("")).await.unwrap();

        assert!(response.message.contains("Welcome to Problem Shifting"));
        assert_eq!(response.next_step_id, "problem_capture");
        assert!(response.error.is_none());

        let saved = store
            .load(&SessionId::new("svc-session").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.current_step.as_str(), "problem_capture");
    }

    #[tokio::test]
    async fn validation_failure_reprompts_without_persisting() {
        let (service, store) = service_with(MockCompletionService::new());
        service.process_user_input(turn("")).await.unwrap();

        let response = service.process_user_input(turn("x")).await.unwrap();

        assert_eq!(
            response.error.as_deref(),
            Some("Please tell me a little more. State the problem in a few words.")
        );
        assert_eq!(response.next_step_id, "problem_capture");

        let saved = store
            .load(&SessionId::new("svc-session").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.current_step.as_str(), "problem_capture");
        assert!(saved.response_for("problem_capture").is_none());
    }

    #[tokio::test]
    async fn accepted_input_advances_and_records_a_response_row() {
        let (service, store) = service_with(MockCompletionService::new());
        service.process_user_input(turn("")).await.unwrap();

        let response = service
            .process_user_input(turn("my boss ignores me"))
            .await
            .unwrap();

        assert_eq!(response.next_step_id, "body_sensation_check");
        assert_eq!(store.response_count().await, 1);
    }

    #[tokio::test]
    async fn trigger_fires_ahead_of_validation_and_keeps_state() {
        let mock = MockCompletionService::new().with_reply("What bothers you most right now?");
        let (service, store) = service_with(mock);
        service.process_user_input(turn("")).await.unwrap();

        let response = service
            .process_user_input(turn("I don't know"))
            .await
            .unwrap();

        let info = response.assistance.unwrap();
        assert!(info.should_return_to_script);
        assert!(info.token_count > 0);
        assert_eq!(response.message, "What bothers you most right now?");
        assert_eq!(response.next_step_id, "problem_capture");

        let saved = store
            .load(&SessionId::new("svc-session").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.current_step.as_str(), "problem_capture");
    }

    #[tokio::test]
    async fn interpreted_step_is_naturalized_on_success() {
        let mock = MockCompletionService::new().with_reply("overwhelmed");
        let (service, _store) = service_with(mock);
        service.process_user_input(turn("")).await.unwrap();
        service
            .process_user_input(turn("my boss ignores me"))
            .await
            .unwrap();

        // body_sensation_check -> what_happens_step (interpreted).
        let response = service
            .process_user_input(turn("like I am overwhelmed"))
            .await
            .unwrap();

        assert_eq!(
            response.message,
            "Feel overwhelmed... what happens in yourself when you feel overwhelmed?"
        );
        let info = response.assistance.unwrap();
        assert!(!info.should_return_to_script);
        assert!(info.token_count > 0);
    }

    #[tokio::test]
    async fn interpreted_step_falls_back_to_quoted_template() {
        // Mock script empty: the extraction call fails, the quoted template
        // survives, accounting reports zero.
        let (service, _store) = service_with(MockCompletionService::new());
        service.process_user_input(turn("")).await.unwrap();
        service
            .process_user_input(turn("my boss ignores me"))
            .await
            .unwrap();

        let response = service
            .process_user_input(turn("like I am overwhelmed"))
            .await
            .unwrap();

        assert_eq!(
            response.message,
            "Feel 'like I am overwhelmed'... what happens in yourself when you feel \
             'like I am overwhelmed'?"
        );
        let info = response.assistance.unwrap();
        assert_eq!(info.token_count, 0);
        assert_eq!(info.cost_cents, 0);
    }

    #[tokio::test]
    async fn fresh_session_discards_previous_state() {
        let (service, store) = service_with(MockCompletionService::new());
        service.process_user_input(turn("")).await.unwrap();
        service
            .process_user_input(turn("my boss ignores me"))
            .await
            .unwrap();

        let response = service
            .start_fresh_session("svc-session", "u-1", Modality::BeliefShifting)
            .await
            .unwrap();

        assert!(response.message.contains("Welcome to Belief Shifting"));
        let saved = store
            .load(&SessionId::new("svc-session").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.modality, Modality::BeliefShifting);
        assert_eq!(saved.current_step.as_str(), "belief_capture");
        assert_eq!(saved.current_phase, Phase::Discovery);
    }

    #[tokio::test]
    async fn empty_session_id_is_rejected() {
        let (service, _store) = service_with(MockCompletionService::new());
        let err = service
            .process_user_input(TurnRequest::new("", "u-1", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn concurrent_turns_for_one_session_serialize() {
        let (service, store) = service_with(MockCompletionService::new());
        let service = Arc::new(service);
        service.process_user_input(turn("")).await.unwrap();

        let a = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .process_user_input(turn("my boss ignores me"))
                    .await
                    .unwrap()
            })
        };
        let b = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .process_user_input(turn("tight in my chest"))
                    .await
                    .unwrap()
            })
        };
        a.await.unwrap();
        b.await.unwrap();

        // Whatever the interleaving, the persisted context is a consistent
        // product of sequential turns, not a clobbered write.
        let saved = store
            .load(&SessionId::new("svc-session").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(catalog_for(saved.modality)
            .step(saved.current_step.as_str())
            .is_some());
    }
}
