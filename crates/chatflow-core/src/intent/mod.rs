//! Intent/fallback reply engine.
//!
//! Instead of generating free text, this engine classifies the message with
//! the backend and answers from a static [`IntentTable`].

pub mod classifier;

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use chatflow_types::generation::GenerationError;
use chatflow_types::intent::{Classification, IntentTable};

use crate::llm::box_provider::BoxLlmProvider;

use self::classifier::IntentClassifier;

/// Pick the reply for a classification.
///
/// Confident classifications (strictly above the threshold) whose label is
/// in the table get a uniformly random canned response; everything else gets
/// the table's fallback.
pub fn select_response<'a, R: Rng + ?Sized>(
    table: &'a IntentTable,
    classification: &Classification,
    rng: &mut R,
) -> &'a str {
    if !classification.is_confident() {
        return &table.fallback;
    }
    table
        .responses_for(&classification.label)
        .and_then(|responses| responses.choose(rng))
        .map_or(&table.fallback, |choice| choice)
}

/// Classifier plus response table.
pub struct IntentResponder {
    classifier: IntentClassifier,
    table: Arc<IntentTable>,
}

impl IntentResponder {
    pub fn new(provider: Arc<BoxLlmProvider>, table: Arc<IntentTable>) -> Self {
        Self {
            classifier: IntentClassifier::new(provider),
            table,
        }
    }

    /// Classify `query` and answer from the table.
    pub async fn respond(&self, query: &str) -> Result<String, GenerationError> {
        let classification = self.classifier.classify(query).await?;
        let reply = select_response(&self.table, &classification, &mut rand::thread_rng());
        debug!(
            label = %classification.label,
            confidence = classification.confidence,
            matched = reply != self.table.fallback,
            "intent classified"
        );
        Ok(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedProvider;
    use chatflow_types::intent::IntentEntry;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn table() -> IntentTable {
        let mut intents = HashMap::new();
        intents.insert(
            "greeting".to_string(),
            IntentEntry {
                responses: vec!["Hello!".to_string(), "Hi there!".to_string()],
            },
        );
        IntentTable {
            intents,
            fallback: "Sorry, I didn't get that.".to_string(),
        }
    }

    fn classification(label: &str, confidence: f64) -> Classification {
        Classification {
            label: label.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_confident_known_label_routes_to_table() {
        let table = table();
        let mut rng = StdRng::seed_from_u64(7);
        let reply = select_response(&table, &classification("greeting", 0.71), &mut rng);
        assert!(reply == "Hello!" || reply == "Hi there!");
    }

    #[test]
    fn test_threshold_confidence_routes_to_fallback() {
        let table = table();
        let mut rng = StdRng::seed_from_u64(7);
        let reply = select_response(&table, &classification("greeting", 0.70), &mut rng);
        assert_eq!(reply, table.fallback);
    }

    #[test]
    fn test_unknown_label_routes_to_fallback() {
        let table = table();
        let mut rng = StdRng::seed_from_u64(7);
        let reply = select_response(&table, &classification("BookFlight", 0.99), &mut rng);
        assert_eq!(reply, table.fallback);
    }

    #[test]
    fn test_selection_covers_all_responses() {
        let table = table();
        let mut rng = StdRng::seed_from_u64(42);
        let c = classification("greeting", 0.95);
        let seen: std::collections::HashSet<&str> = (0..200)
            .map(|_| select_response(&table, &c, &mut rng))
            .collect();
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn test_responder_answers_from_table() {
        let provider = ScriptedProvider::replying(r#"{"intent":"greeting","confidence":0.9}"#);
        let responder =
            IntentResponder::new(Arc::new(BoxLlmProvider::new(provider)), Arc::new(table()));
        let reply = responder.respond("hey").await.unwrap();
        assert!(reply == "Hello!" || reply == "Hi there!");
    }

    #[tokio::test]
    async fn test_responder_propagates_malformed_classification() {
        let provider = ScriptedProvider::replying("not json");
        let responder =
            IntentResponder::new(Arc::new(BoxLlmProvider::new(provider)), Arc::new(table()));
        let err = responder.respond("hey").await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedClassification(_)));
    }
}
