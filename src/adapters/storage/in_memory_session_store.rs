//! In-Memory Session Store
//!
//! Stores contexts and response rows in memory. Useful for testing and
//! development; does not survive restarts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{SessionId, StepId};
use crate::domain::protocol::{Phase, SessionContext};
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory implementation of the session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    contexts: Arc<RwLock<HashMap<String, SessionContext>>>,
    responses: Arc<RwLock<HashMap<(String, &'static str, String), String>>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all stored data (useful for tests).
    pub async fn clear(&self) {
        self.contexts.write().await.clear();
        self.responses.write().await.clear();
    }

    /// Number of stored contexts.
    pub async fn context_count(&self) -> usize {
        self.contexts.read().await.len()
    }

    /// Number of stored response rows.
    pub async fn response_count(&self) -> usize {
        self.responses.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionContext>, SessionStoreError> {
        let contexts = self.contexts.read().await;
        Ok(contexts.get(session_id.as_str()).cloned())
    }

    async fn save(&self, ctx: &SessionContext) -> Result<(), SessionStoreError> {
        let mut contexts = self.contexts.write().await;
        contexts.insert(ctx.session_id.as_str().to_string(), ctx.clone());
        Ok(())
    }

    async fn save_response(
        &self,
        session_id: &SessionId,
        phase: Phase,
        step: &StepId,
        response: &str,
    ) -> Result<(), SessionStoreError> {
        let mut responses = self.responses.write().await;
        responses.insert(
            (
                session_id.as_str().to_string(),
                phase.label(),
                step.as_str().to_string(),
            ),
            response.to_string(),
        );
        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), SessionStoreError> {
        self.contexts.write().await.remove(session_id.as_str());
        let mut responses = self.responses.write().await;
        responses.retain(|(sid, _, _), _| sid != session_id.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::protocol::Modality;

    fn session_id() -> SessionId {
        SessionId::new("mem-test").unwrap()
    }

    fn context() -> SessionContext {
        SessionContext::new(
            session_id(),
            UserId::new("u-1").unwrap(),
            Modality::ProblemShifting,
        )
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let store = InMemorySessionStore::new();
        let ctx = context();

        store.save(&ctx).await.unwrap();
        let loaded = store.load(&session_id()).await.unwrap().unwrap();
        assert_eq!(loaded, ctx);
    }

    #[tokio::test]
    async fn load_unknown_session_is_none() {
        let store = InMemorySessionStore::new();
        assert!(store.load(&session_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let store = InMemorySessionStore::new();
        let mut ctx = context();
        store.save(&ctx).await.unwrap();

        ctx.advance_to("body_sensation_check", Phase::Working);
        store.save(&ctx).await.unwrap();

        let loaded = store.load(&session_id()).await.unwrap().unwrap();
        assert_eq!(loaded.current_step.as_str(), "body_sensation_check");
        assert_eq!(store.context_count().await, 1);
    }

    #[tokio::test]
    async fn response_rows_upsert_by_step() {
        let store = InMemorySessionStore::new();
        let step = StepId::new("problem_capture");

        store
            .save_response(&session_id(), Phase::Discovery, &step, "first")
            .await
            .unwrap();
        store
            .save_response(&session_id(), Phase::Discovery, &step, "second")
            .await
            .unwrap();

        assert_eq!(store.response_count().await, 1);
    }

    #[tokio::test]
    async fn delete_removes_context_and_responses() {
        let store = InMemorySessionStore::new();
        let ctx = context();
        store.save(&ctx).await.unwrap();
        store
            .save_response(
                &session_id(),
                Phase::Discovery,
                &StepId::new("problem_capture"),
                "my boss",
            )
            .await
            .unwrap();

        store.delete(&session_id()).await.unwrap();

        assert!(store.load(&session_id()).await.unwrap().is_none());
        assert_eq!(store.response_count().await, 0);
    }
}
