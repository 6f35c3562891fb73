//! Deployment configuration for ChatFlow.
//!
//! `ChatflowConfig` represents the top-level `config.toml` that selects the
//! reply engine, the generation backend, and the sampling settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::generation::{DeploymentMode, GenerationConfig};

/// Opening bot message of every new conversation.
pub const DEFAULT_GREETING: &str =
    "Welcome to ChatFlow! I'm a modular AI assistant. How can I help you?";

/// Apology substituted for any failed turn.
pub const FALLBACK_MESSAGE: &str = "I'm sorry, but I encountered an error. Please try again later.";

/// Key under which a client persists its session identifier.
pub const SESSION_ID_KEY: &str = "chatflow-session-id";

/// Top-level configuration.
///
/// Loaded from `~/.chatflow/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatflowConfig {
    /// Which reply engine this deployment runs.
    #[serde(default)]
    pub mode: DeploymentMode,

    /// First bot message shown in a new conversation.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Reply substituted when a turn fails.
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,

    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub generation: GenerationConfig,

    /// Intent table location. Relative paths resolve against the data dir.
    #[serde(default = "default_intent_table")]
    pub intent_table: PathBuf,
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

fn default_fallback_message() -> String {
    FALLBACK_MESSAGE.to_string()
}

fn default_intent_table() -> PathBuf {
    PathBuf::from("intents.json")
}

impl Default for ChatflowConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::default(),
            greeting: default_greeting(),
            fallback_message: default_fallback_message(),
            provider: ProviderSettings::default(),
            generation: GenerationConfig::default(),
            intent_table: default_intent_table(),
        }
    }
}

/// Model and key variable a named backend uses when the config omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderPreset {
    pub name: &'static str,
    pub model: &'static str,
    pub api_key_env: &'static str,
}

pub const PROVIDER_PRESETS: &[ProviderPreset] = &[
    ProviderPreset {
        name: "gemini",
        model: "gemini-2.5-flash",
        api_key_env: "GEMINI_API_KEY",
    },
    ProviderPreset {
        name: "openai",
        model: "gpt-4o-mini",
        api_key_env: "OPENAI_API_KEY",
    },
    ProviderPreset {
        name: "mistral",
        model: "mistral-large-latest",
        api_key_env: "MISTRAL_API_KEY",
    },
];

/// Key variable for a custom backend that names none.
pub const CUSTOM_API_KEY_ENV: &str = "CHATFLOW_API_KEY";

/// Which OpenAI-compatible backend to talk to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Preset name: "gemini", "openai" or "mistral". Anything else needs `base_url`.
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Overrides the preset's endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Defaults to the preset's model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable holding the API key. Defaults to the preset's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_provider_name() -> String {
    "gemini".to_string()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: None,
            model: None,
            api_key_env: None,
        }
    }
}

impl ProviderSettings {
    pub fn preset(&self) -> Option<&'static ProviderPreset> {
        PROVIDER_PRESETS.iter().find(|preset| preset.name == self.name)
    }

    /// The configured model, else the preset's. `None` for a custom backend
    /// without an explicit model.
    pub fn resolved_model(&self) -> Option<&str> {
        self.model
            .as_deref()
            .or_else(|| self.preset().map(|preset| preset.model))
    }

    pub fn resolved_api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .or_else(|| self.preset().map(|preset| preset.api_key_env))
            .unwrap_or(CUSTOM_API_KEY_ENV)
    }
}
