//! PostgreSQL Session Store
//!
//! Persists contexts as JSON text keyed by session id, plus one row per
//! recorded response for reporting. Expected schema:
//!
//! ```sql
//! CREATE TABLE sessions (
//!     session_id TEXT PRIMARY KEY,
//!     context    TEXT NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE session_responses (
//!     session_id TEXT NOT NULL,
//!     phase      TEXT NOT NULL,
//!     step_id    TEXT NOT NULL,
//!     response   TEXT NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (session_id, phase, step_id)
//! );
//! ```

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{SessionId, StepId};
use crate::domain::protocol::{Phase, SessionContext};
use crate::ports::{SessionStore, SessionStoreError};

/// PostgreSQL implementation of the session store.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    /// Creates a store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionContext>, SessionStoreError> {
        let row = sqlx::query("SELECT context FROM sessions WHERE session_id = $1")
            .bind(session_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SessionStoreError::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let json: String = row
                    .try_get("context")
                    .map_err(|e| SessionStoreError::Database(e.to_string()))?;
                serde_json::from_str(&json)
                    .map(Some)
                    .map_err(|e| SessionStoreError::DeserializationFailed(e.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, ctx: &SessionContext) -> Result<(), SessionStoreError> {
        let json = serde_json::to_string(ctx)
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (session_id, context, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (session_id)
            DO UPDATE SET context = EXCLUDED.context, updated_at = NOW()
            "#,
        )
        .bind(ctx.session_id.as_str())
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionStoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn save_response(
        &self,
        session_id: &SessionId,
        phase: Phase,
        step: &StepId,
        response: &str,
    ) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
            INSERT INTO session_responses (session_id, phase, step_id, response, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (session_id, phase, step_id)
            DO UPDATE SET response = EXCLUDED.response, updated_at = NOW()
            "#,
        )
        .bind(session_id.as_str())
        .bind(phase.label())
        .bind(step.as_str())
        .bind(response)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionStoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), SessionStoreError> {
        sqlx::query("DELETE FROM session_responses WHERE session_id = $1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| SessionStoreError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| SessionStoreError::Database(e.to_string()))?;

        Ok(())
    }
}
