//! Intent table loader.

use std::path::Path;

use chatflow_types::error::IntentTableError;
use chatflow_types::intent::IntentTable;

/// Load and validate the intent table at `path`.
///
/// The table must have a non-empty `fallback`. Intents with no responses
/// are kept but logged, since lookups treat them as unknown.
pub async fn load_intent_table(path: &Path) -> Result<IntentTable, IntentTableError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(IntentTableError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(IntentTableError::Io(e.to_string())),
    };

    let table: IntentTable =
        serde_json::from_str(&content).map_err(|e| IntentTableError::Invalid(e.to_string()))?;

    if table.fallback.trim().is_empty() {
        return Err(IntentTableError::Invalid("fallback must not be empty".to_string()));
    }

    for (name, entry) in &table.intents {
        if entry.responses.is_empty() {
            tracing::warn!(intent = %name, "Intent has no responses; it will never match");
        }
    }

    tracing::info!(
        path = %path.display(),
        intents = table.intents.len(),
        "Loaded intent table"
    );
    Ok(table)
}
