//! File-backed client key-value store.
//!
//! Terminal clients persist their state (today just the session id) in a
//! small JSON object at `{data_dir}/client_state.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use chatflow_core::session::ClientStore;
use chatflow_types::error::RepositoryError;

pub const CLIENT_STATE_FILE: &str = "client_state.json";

/// JSON-object file store. Writes replace the whole file.
pub struct FileClientStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileClientStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at the default location inside `data_dir`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(CLIENT_STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, RepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(RepositoryError::Unavailable(e.to_string())),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Corrupt client state file; starting fresh"
                );
                Ok(BTreeMap::new())
            }
        }
    }
}

impl ClientStore for FileClientStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))
    }
}
