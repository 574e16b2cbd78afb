//! File-backed Session Store
//!
//! One JSON file per session under a root directory, with a sidecar file for
//! the response rows. Suitable for single-server deployments and local
//! development where a database is overkill.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::foundation::{SessionId, StepId};
use crate::domain::protocol::{Phase, SessionContext};
use crate::ports::{SessionStore, SessionStoreError};

/// File-based implementation of the session store.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created lazily on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Session ids are client-supplied; only a conservative character set
    /// reaches the filesystem.
    fn sanitize(session_id: &SessionId) -> String {
        session_id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    }

    fn context_path(&self, session_id: &SessionId) -> PathBuf {
        self.root.join(format!("{}.json", Self::sanitize(session_id)))
    }

    fn responses_path(&self, session_id: &SessionId) -> PathBuf {
        self.root
            .join(format!("{}.responses.json", Self::sanitize(session_id)))
    }

    async fn ensure_root(&self) -> Result<(), SessionStoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))
    }

    async fn read_responses(
        &self,
        session_id: &SessionId,
    ) -> Result<BTreeMap<String, String>, SessionStoreError> {
        match tokio::fs::read(self.responses_path(session_id)).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| SessionStoreError::DeserializationFailed(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(SessionStoreError::Io(e.to_string())),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionContext>, SessionStoreError> {
        match tokio::fs::read(self.context_path(session_id)).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| SessionStoreError::DeserializationFailed(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionStoreError::Io(e.to_string())),
        }
    }

    async fn save(&self, ctx: &SessionContext) -> Result<(), SessionStoreError> {
        self.ensure_root().await?;
        let bytes = serde_json::to_vec_pretty(ctx)
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;
        tokio::fs::write(self.context_path(&ctx.session_id), bytes)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))
    }

    async fn save_response(
        &self,
        session_id: &SessionId,
        phase: Phase,
        step: &StepId,
        response: &str,
    ) -> Result<(), SessionStoreError> {
        self.ensure_root().await?;
        let mut responses = self.read_responses(session_id).await?;
        responses.insert(
            format!("{}/{}", phase.label(), step.as_str()),
            response.to_string(),
        );
        let bytes = serde_json::to_vec_pretty(&responses)
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;
        tokio::fs::write(self.responses_path(session_id), bytes)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), SessionStoreError> {
        for path in [self.context_path(session_id), self.responses_path(session_id)] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(SessionStoreError::Io(e.to_string())),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::protocol::Modality;
    use tempfile::TempDir;

    fn session_id() -> SessionId {
        SessionId::new("file-test").unwrap()
    }

    fn context() -> SessionContext {
        SessionContext::new(
            session_id(),
            UserId::new("u-1").unwrap(),
            Modality::BeliefShifting,
        )
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        let ctx = context();

        store.save(&ctx).await.unwrap();
        let loaded = store.load(&session_id()).await.unwrap().unwrap();
        assert_eq!(loaded, ctx);
    }

    #[tokio::test]
    async fn load_unknown_session_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load(&session_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn hostile_session_ids_stay_inside_the_root() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        let sneaky = SessionId::new("../../etc/passwd").unwrap();

        let path = store.context_path(&sneaky);
        assert!(path.starts_with(dir.path()));
        assert!(!path.to_string_lossy().contains(".."));
    }

    #[tokio::test]
    async fn responses_accumulate_in_sidecar() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        store
            .save_response(
                &session_id(),
                Phase::Discovery,
                &StepId::new("belief_capture"),
                "I am not good enough",
            )
            .await
            .unwrap();
        store
            .save_response(
                &session_id(),
                Phase::Working,
                &StepId::new("belief_feel_step"),
                "heavy",
            )
            .await
            .unwrap();

        let responses = store.read_responses(&session_id()).await.unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(
            responses.get("discovery/belief_capture").map(String::as_str),
            Some("I am not good enough")
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        let ctx = context();
        store.save(&ctx).await.unwrap();

        store.delete(&session_id()).await.unwrap();
        store.delete(&session_id()).await.unwrap();

        assert!(store.load(&session_id()).await.unwrap().is_none());
    }
}
