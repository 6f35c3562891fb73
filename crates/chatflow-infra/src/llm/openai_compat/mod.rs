//! OpenAI-compatible generation backend.
//!
//! One [`OpenAiCompatibleProvider`] serves Google Gemini (the default),
//! OpenAI, Mistral and any self-hosted server speaking the chat completions
//! protocol. Only the base URL differs.

pub mod config;
pub mod streaming;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionStreamOptions,
    CreateChatCompletionRequest, CreateChatCompletionResponse,
};
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};

use chatflow_core::llm::provider::{LlmEventStream, LlmProvider};
use chatflow_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, PromptMessage, PromptRole,
    ProviderCapabilities, StopReason, Usage,
};

use self::config::OpenAiCompatConfig;
use self::streaming::{map_finish_reason, map_openai_stream};

/// Chat completions client for one configured backend.
///
/// Not `Debug`: the client holds the API key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
            capabilities: config.capabilities,
        }
    }

    /// Gemini through its OpenAI compatibility endpoint.
    pub fn gemini(api_key: SecretString, model: &str) -> Self {
        Self::new(config::gemini_defaults(api_key, model))
    }

    pub fn openai(api_key: SecretString, model: &str) -> Self {
        Self::new(config::openai_defaults(api_key, model))
    }

    pub fn mistral(api_key: SecretString, model: &str) -> Self {
        Self::new(config::mistral_defaults(api_key, model))
    }

    fn build_request(&self, request: &CompletionRequest, stream: bool) -> CreateChatCompletionRequest {
        let messages = request
            .system
            .as_deref()
            .map(system_message)
            .into_iter()
            .chain(request.messages.iter().map(wire_message))
            .collect();

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            stream: stream.then_some(true),
            // Usage only arrives on a stream when asked for.
            stream_options: stream.then_some(ChatCompletionStreamOptions {
                include_usage: Some(true),
                include_obfuscation: None,
            }),
            ..Default::default()
        }
    }
}

fn system_message(text: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: ChatCompletionRequestSystemMessageContent::Text(text.to_string()),
        name: None,
    })
}

fn wire_message(message: &PromptMessage) -> ChatCompletionRequestMessage {
    match message.role {
        PromptRole::System => system_message(&message.content),
        PromptRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(message.content.clone()),
            name: None,
        }),
        #[allow(deprecated)]
        PromptRole::Assistant => {
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    message.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

/// Keep the first choice; backends asked for one never send more.
fn into_completion(response: CreateChatCompletionResponse) -> CompletionResponse {
    let first = response.choices.into_iter().next();
    let stop_reason = first
        .as_ref()
        .and_then(|choice| choice.finish_reason.as_ref())
        .map(map_finish_reason)
        .unwrap_or(StopReason::EndTurn);
    let content = first
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    CompletionResponse {
        id: response.id,
        content,
        model: response.model,
        stop_reason,
        usage: response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default(),
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .chat()
            .create(self.build_request(request, false))
            .await
            .map_err(map_openai_error)?;
        Ok(into_completion(response))
    }

    fn stream(&self, request: CompletionRequest) -> LlmEventStream {
        let wire_request = self.build_request(&request, true);
        let client = self.client.clone();

        Box::pin(async_stream::try_stream! {
            let chunks = client
                .chat()
                .create_stream(wire_request)
                .await
                .map_err(map_openai_error)?;

            let mut events = map_openai_stream(chunks);
            while let Some(event) = events.next().await {
                yield event?;
            }
        })
    }
}

/// Classify an API error body. Gemini reports gRPC-style status codes
/// (`RESOURCE_EXHAUSTED`, `UNAVAILABLE`) where OpenAI uses snake_case ones.
fn classify_api_error(code: &str, error_type: &str, message: &str) -> Option<LlmError> {
    let auth = matches!(code, "authentication_error" | "invalid_api_key" | "PERMISSION_DENIED")
        || error_type == "authentication_error"
        || message.contains("Incorrect API key")
        || message.contains("API key not valid");
    if auth {
        return Some(LlmError::AuthenticationFailed);
    }

    match (code, error_type) {
        ("rate_limit_exceeded" | "RESOURCE_EXHAUSTED", _) | (_, "rate_limit_error") => {
            Some(LlmError::RateLimited)
        }
        ("server_error" | "UNAVAILABLE", _) | (_, "overloaded_error") => {
            Some(LlmError::Overloaded(message.to_string()))
        }
        _ => None,
    }
}

fn map_openai_error(err: OpenAIError) -> LlmError {
    match &err {
        OpenAIError::ApiError(api_err) => classify_api_error(
            api_err.code.as_deref().unwrap_or(""),
            api_err.r#type.as_deref().unwrap_or(""),
            &api_err.message,
        )
        .unwrap_or_else(|| LlmError::Provider {
            message: err.to_string(),
        }),
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401 | 403) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited,
            Some(503 | 529) => LlmError::Overloaded(err.to_string()),
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::StreamError(stream_err) => LlmError::Stream(stream_err.to_string()),
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}
