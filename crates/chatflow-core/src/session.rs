//! Per-client session identifiers.
//!
//! A client keeps exactly one session id in its local key-value storage
//! under [`SESSION_ID_KEY`]. The id is created on first use and reused
//! forever after.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use chatflow_types::chat::SessionId;
use chatflow_types::config::SESSION_ID_KEY;
use chatflow_types::error::{RepositoryError, SessionError};

/// Client-local persistent key-value storage.
///
/// Implementations live in chatflow-infra (e.g., `FileClientStore`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ClientStore: Send + Sync {
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    entries: Mutex<HashMap<String, String>>,
}

impl ClientStore for MemoryClientStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Return the stored session id, creating and persisting one if absent.
///
/// A blank stored value is treated as absent.
pub async fn get_or_create_session_id<S: ClientStore>(store: &S) -> Result<SessionId, SessionError> {
    if let Some(existing) = store.get(SESSION_ID_KEY).await? {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(SessionId(trimmed.to_string()));
        }
    }

    let id = SessionId::generate();
    store.set(SESSION_ID_KEY, id.as_str()).await?;
    debug!(session_id = %id, "created new session id");
    Ok(id)
}
