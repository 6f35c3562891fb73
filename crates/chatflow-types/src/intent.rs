//! Intent response table and classification types.
//!
//! The table is a static JSON document loaded once at start-up:
//!
//! ```json
//! {
//!   "intents": { "greeting": { "responses": ["Hello!", "Hi there!"] } },
//!   "fallback": "I'm not sure I understand."
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classifications must be strictly above this confidence to hit the table.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Canned responses for one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentEntry {
    #[serde(default)]
    pub responses: Vec<String>,
}

/// The full intent table. Read-only after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentTable {
    #[serde(default)]
    pub intents: HashMap<String, IntentEntry>,
    pub fallback: String,
}

impl IntentTable {
    /// Responses registered for `label`, if any are non-empty.
    pub fn responses_for(&self, label: &str) -> Option<&[String]> {
        self.intents
            .get(label)
            .map(|entry| entry.responses.as_slice())
            .filter(|responses| !responses.is_empty())
    }
}

/// Result of asking the backend to classify a user query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Concise intent term, e.g. `"BookFlight"`.
    #[serde(alias = "intent")]
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Classification {
    /// Whether this classification is confident enough to route to the table.
    pub fn is_confident(&self) -> bool {
        self.confidence > CONFIDENCE_THRESHOLD
    }
}
