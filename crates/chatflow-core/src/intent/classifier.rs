//! LLM-backed intent classification.
//!
//! `IntentClassifier` asks the backend to name the user's goal as a single
//! concise term plus a confidence score, returned as JSON.

use std::sync::Arc;

use tracing::{Instrument, info_span, warn};

use chatflow_types::generation::GenerationError;
use chatflow_types::intent::Classification;
use chatflow_types::llm::{CompletionRequest, PromptMessage};

use crate::llm::box_provider::BoxLlmProvider;

/// System prompt for the classification call.
const CLASSIFICATION_SYSTEM_PROMPT: &str = r#"You are an intent recognition expert. Analyze the user query and determine the intent.

Return the intent and a confidence score (0-1) for the accuracy of your intent recognition. A confidence score of 1 indicates complete confidence, while a confidence score of 0 indicates no confidence.

Ensure the intent is a single, concise term representing the user's goal. For example, "BookFlight" or "GetWeather".

Respond with a single JSON object and nothing else:
{"intent": "GetWeather", "confidence": 0.92}"#;

pub struct IntentClassifier {
    provider: Arc<BoxLlmProvider>,
}

impl IntentClassifier {
    pub fn new(provider: Arc<BoxLlmProvider>) -> Self {
        Self { provider }
    }

    /// Classify `query`. Sent at temperature 0.0.
    ///
    /// A backend failure or a reply that is not the expected JSON object is a
    /// [`GenerationError`].
    pub async fn classify(&self, query: &str) -> Result<Classification, GenerationError> {
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![PromptMessage::user(format!("User Query: {query}"))],
            system: Some(CLASSIFICATION_SYSTEM_PROMPT.to_string()),
            max_tokens: 128,
            temperature: Some(0.0),
            stream: false,
        };

        let span = info_span!(
            "gen_ai.classify",
            gen_ai.system = self.provider.name(),
            gen_ai.request.max_tokens = request.max_tokens,
        );
        let response = self.provider.complete(&request).instrument(span).await?;

        parse_classification(&response.content)
    }
}

/// Parse the backend's classification reply.
///
/// Tolerates a surrounding markdown code fence. Confidence is clamped into
/// `[0, 1]`; a NaN confidence counts as zero.
pub fn parse_classification(raw: &str) -> Result<Classification, GenerationError> {
    let body = strip_code_fence(raw.trim());

    let mut classification: Classification = serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        warn!(
            error = %e,
            content_preview = %preview,
            "Failed to parse intent classification JSON"
        );
        GenerationError::MalformedClassification(e.to_string())
    })?;

    classification.label = classification.label.trim().to_string();
    classification.confidence = if classification.confidence.is_nan() {
        0.0
    } else {
        classification.confidence.clamp(0.0, 1.0)
    };
    Ok(classification)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedProvider;

    #[test]
    fn test_parse_plain_json() {
        let c = parse_classification(r#"{"intent": "GetWeather", "confidence": 0.92}"#).unwrap();
        assert_eq!(c.label, "GetWeather");
        assert!((c.confidence - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"intent\": \"greeting\", \"confidence\": 0.8}\n```";
        let c = parse_classification(raw).unwrap();
        assert_eq!(c.label, "greeting");
    }

    #[test]
    fn test_parse_clamps_confidence() {
        let c = parse_classification(r#"{"intent": "greeting", "confidence": 7}"#).unwrap();
        assert!((c.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = parse_classification("The user wants to book a flight.").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedClassification(_)));
    }

    #[test]
    fn test_parse_failure_logs_multibyte_reply_without_panicking() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(std::io::sink)
            .finish();
        // 199 ASCII bytes put the two-byte 'é' across the 200th byte.
        let raw = format!("{}é not json", "a".repeat(199));

        let result = tracing::subscriber::with_default(subscriber, || parse_classification(&raw));
        assert!(matches!(result, Err(GenerationError::MalformedClassification(_))));
    }

    #[tokio::test]
    async fn test_classify_sends_deterministic_request() {
        let provider = ScriptedProvider::replying(r#"{"intent":"BookFlight","confidence":0.9}"#);
        let requests = provider.requests();
        let classifier = IntentClassifier::new(Arc::new(BoxLlmProvider::new(provider)));

        let c = classifier.classify("I need a flight to Oslo").await.unwrap();
        assert_eq!(c.label, "BookFlight");

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].temperature, Some(0.0));
        assert!(!requests[0].stream);
        assert!(requests[0].messages[0].content.contains("flight to Oslo"));
    }

    #[tokio::test]
    async fn test_classify_backend_failure() {
        let classifier =
            IntentClassifier::new(Arc::new(BoxLlmProvider::new(ScriptedProvider::failing("down"))));
        let err = classifier.classify("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::Backend(_)));
    }
}
