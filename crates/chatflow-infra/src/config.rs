//! Deployment configuration loader for ChatFlow.
//!
//! Reads `config.toml` from the data directory (`~/.chatflow/` in production)
//! and deserializes it into [`ChatflowConfig`]. Falls back to sensible
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use chatflow_types::config::ChatflowConfig;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CHATFLOW_DATA_DIR` environment variable
/// 2. `~/.chatflow`
/// 3. `.chatflow` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATFLOW_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".chatflow");
    }

    PathBuf::from(".chatflow")
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`ChatflowConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
///
/// The sampling temperature is always clamped into `[0, 1]`.
pub async fn load_config(path: &Path) -> ChatflowConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return ChatflowConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return ChatflowConfig::default();
        }
    };

    let mut config = match toml::from_str::<ChatflowConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            ChatflowConfig::default()
        }
    };
    config.generation = config.generation.normalized();
    config
}

/// Resolve a configured path against the data directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_in_data_dir(data_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}
