//! Generation settings, requests, and the pipeline failure type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::ChatMessage;
use crate::llm::LlmError;

/// Sampling configuration passed uniformly to every backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature in `[0, 1]`.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Upper bound on generated tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl GenerationConfig {
    /// Clamp the temperature into `[0, 1]`. NaN falls back to the default.
    pub fn normalized(mut self) -> Self {
        self.temperature = if self.temperature.is_nan() {
            default_temperature()
        } else {
            self.temperature.clamp(0.0, 1.0)
        };
        self
    }
}

/// One user turn: the new message plus everything said before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// Which reply engine a deployment runs.
///
/// Chosen once at start-up; never switched per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Await the full completion and return one string.
    Buffered,
    /// Return a lazy sequence of text fragments.
    #[default]
    Streaming,
    /// Classify the message and answer from the static intent table.
    Intent,
}

impl DeploymentMode {
    /// Whether replies in this mode arrive as a fragment stream.
    pub fn is_streaming(&self) -> bool {
        matches!(self, DeploymentMode::Streaming)
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Buffered => write!(f, "buffered"),
            DeploymentMode::Streaming => write!(f, "streaming"),
            DeploymentMode::Intent => write!(f, "intent"),
        }
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buffered" => Ok(DeploymentMode::Buffered),
            "streaming" => Ok(DeploymentMode::Streaming),
            "intent" => Ok(DeploymentMode::Intent),
            other => Err(format!("invalid deployment mode: '{other}'")),
        }
    }
}

/// The single failure condition the reply engines surface to the transport.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation failed: {0}")]
    Backend(#[from] LlmError),

    #[error("generation failed: backend returned no text")]
    EmptyResponse,

    #[error("generation failed: malformed classification: {0}")]
    MalformedClassification(String),
}
