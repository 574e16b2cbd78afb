//! Session Store Port - interface for persisting session state.
//!
//! Contexts are upserted whole by session id; individual responses are also
//! upserted as (session id, phase, step id) rows for reporting. The
//! application layer logs store failures and never raises them: a save
//! failure does not fail the in-flight request.

use async_trait::async_trait;

use crate::domain::foundation::{SessionId, StepId};
use crate::domain::protocol::{Phase, SessionContext};

/// Errors from the session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("failed to serialize context: {0}")]
    SerializationFailed(String),

    #[error("failed to deserialize context: {0}")]
    DeserializationFailed(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Port for durable session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a session's context, or `None` if the session is unknown.
    async fn load(&self, session_id: &SessionId)
        -> Result<Option<SessionContext>, SessionStoreError>;

    /// Upserts a session's context.
    async fn save(&self, ctx: &SessionContext) -> Result<(), SessionStoreError>;

    /// Upserts one recorded response.
    async fn save_response(
        &self,
        session_id: &SessionId,
        phase: Phase,
        step: &StepId,
        response: &str,
    ) -> Result<(), SessionStoreError>;

    /// Deletes a session's context and responses.
    async fn delete(&self, session_id: &SessionId) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_their_category() {
        assert!(SessionStoreError::Io("disk full".into())
            .to_string()
            .contains("io error"));
        assert!(SessionStoreError::Database("connection refused".into())
            .to_string()
            .contains("database error"));
        assert!(
            SessionStoreError::SerializationFailed("bad value".into())
                .to_string()
                .contains("serialize")
        );
    }
}
