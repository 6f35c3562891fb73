//! Application state wiring the reply engine together.
//!
//! AppState holds the single transport action used by both the CLI and the
//! HTTP server. The deployment mode is resolved here, once, and never
//! changes afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use chatflow_core::llm::box_provider::BoxLlmProvider;
use chatflow_core::transport::{TransportAction, TurnEngine};
use chatflow_infra::config::{CONFIG_FILE_NAME, load_config, resolve_data_dir, resolve_in_data_dir};
use chatflow_infra::intent_table::load_intent_table;
use chatflow_infra::llm::create_provider;
use chatflow_infra::secret::resolve_api_key;
use chatflow_types::config::ChatflowConfig;
use chatflow_types::generation::DeploymentMode;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub transport: Arc<TransportAction>,
    pub config: Arc<ChatflowConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load the configuration, resolve the backend, and build the engine.
    ///
    /// `config_path` defaults to `config.toml` in the data directory;
    /// `mode` overrides the configured deployment mode.
    pub async fn init(
        config_path: Option<&Path>,
        mode: Option<DeploymentMode>,
    ) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
        let mut config = load_config(&config_path).await;
        if let Some(mode) = mode {
            config.mode = mode;
        }

        let api_key = resolve_api_key(&config.provider)?;
        let provider = create_provider(&config.provider, api_key)?;

        Self::with_provider(config, data_dir, provider).await
    }

    /// Build the state around an already constructed backend.
    pub async fn with_provider(
        config: ChatflowConfig,
        data_dir: PathBuf,
        provider: BoxLlmProvider,
    ) -> anyhow::Result<Self> {
        let provider = Arc::new(provider);
        let engine = match config.mode {
            DeploymentMode::Intent => {
                let path = resolve_in_data_dir(&data_dir, &config.intent_table);
                let table = load_intent_table(&path).await?;
                TurnEngine::intent(provider, Arc::new(table))
            }
            mode => TurnEngine::generative(provider, config.generation.clone(), mode.is_streaming())?,
        };

        info!(
            mode = %engine.mode(),
            provider = %config.provider.name,
            model = config.provider.resolved_model().unwrap_or("unset"),
            "reply engine ready"
        );

        let transport = TransportAction::new(engine, config.fallback_message.clone());
        Ok(Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubProvider;
    use tempfile::TempDir;

    fn config(mode: DeploymentMode) -> ChatflowConfig {
        ChatflowConfig {
            mode,
            ..ChatflowConfig::default()
        }
    }

    #[tokio::test]
    async fn test_generative_modes_build_matching_engine() {
        let tmp = TempDir::new().unwrap();
        for mode in [DeploymentMode::Buffered, DeploymentMode::Streaming] {
            let state = AppState::with_provider(
                config(mode),
                tmp.path().to_path_buf(),
                StubProvider::fragments(&["hi"]),
            )
            .await
            .unwrap();
            assert_eq!(state.transport.mode(), mode);
        }
    }

    #[tokio::test]
    async fn test_intent_mode_loads_table_from_data_dir() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("intents.json"),
            r#"{"intents":{"greeting":{"responses":["Hello!"]}},"fallback":"Pardon?"}"#,
        )
        .await
        .unwrap();

        let state = AppState::with_provider(
            config(DeploymentMode::Intent),
            tmp.path().to_path_buf(),
            StubProvider::fragments(&["{}"]),
        )
        .await
        .unwrap();
        assert_eq!(state.transport.mode(), DeploymentMode::Intent);
    }

    #[tokio::test]
    async fn test_intent_mode_without_table_fails() {
        let tmp = TempDir::new().unwrap();
        let result = AppState::with_provider(
            config(DeploymentMode::Intent),
            tmp.path().to_path_buf(),
            StubProvider::fragments(&["{}"]),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_streaming_mode_refused_for_buffered_only_backend() {
        let tmp = TempDir::new().unwrap();
        let err = AppState::with_provider(
            config(DeploymentMode::Streaming),
            tmp.path().to_path_buf(),
            StubProvider::buffered_only("hi"),
        )
        .await
        .err()
        .unwrap();
        assert!(err.to_string().contains("does not support streaming"));

        let state = AppState::with_provider(
            config(DeploymentMode::Buffered),
            tmp.path().to_path_buf(),
            StubProvider::buffered_only("hi"),
        )
        .await
        .unwrap();
        assert_eq!(state.transport.mode(), DeploymentMode::Buffered);
    }
}
