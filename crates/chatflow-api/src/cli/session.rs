//! `chatflow session` - show or rotate the persisted session id.

use std::path::Path;

use anyhow::Result;
use console::style;

use chatflow_core::session::{ClientStore, get_or_create_session_id};
use chatflow_infra::client_store::FileClientStore;
use chatflow_types::chat::SessionId;
use chatflow_types::config::SESSION_ID_KEY;
use chatflow_types::error::SessionError;

/// Return the session id, replacing the stored one first when `rotate` is set.
pub async fn current_session_id<S: ClientStore>(
    store: &S,
    rotate: bool,
) -> Result<SessionId, SessionError> {
    if rotate {
        let id = SessionId::generate();
        store.set(SESSION_ID_KEY, id.as_str()).await?;
        tracing::info!(session_id = %id, "rotated session id");
        return Ok(id);
    }
    get_or_create_session_id(store).await
}

/// Print the session id stored under `data_dir`.
pub async fn show_session(data_dir: &Path, rotate: bool, json: bool) -> Result<()> {
    tokio::fs::create_dir_all(data_dir).await?;
    let store = FileClientStore::in_data_dir(data_dir);
    let id = current_session_id(&store, rotate).await?;

    if json {
        let out = serde_json::json!({
            "session_id": id.as_str(),
            "store": store.path().display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}  {}", style("Session:").bold(), style(id.as_str()).cyan());
    println!(
        "  {}    {}",
        style("Store:").bold(),
        style(store.path().display()).dim()
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_session_id_is_stable_across_stores() {
        let tmp = TempDir::new().unwrap();
        let first = current_session_id(&FileClientStore::in_data_dir(tmp.path()), false)
            .await
            .unwrap();
        let second = current_session_id(&FileClientStore::in_data_dir(tmp.path()), false)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_rotate_replaces_stored_id() {
        let tmp = TempDir::new().unwrap();
        let store = FileClientStore::in_data_dir(tmp.path());
        let original = current_session_id(&store, false).await.unwrap();
        let rotated = current_session_id(&store, true).await.unwrap();
        assert_ne!(original, rotated);
        assert_eq!(current_session_id(&store, false).await.unwrap(), rotated);
    }
}
