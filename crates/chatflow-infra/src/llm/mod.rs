//! Generation backend implementations.
//!
//! Provides a factory ([`create_provider`]) that constructs the right
//! [`BoxLlmProvider`] from the configured [`ProviderSettings`].

pub mod openai_compat;

use secrecy::SecretString;

use chatflow_core::llm::box_provider::BoxLlmProvider;
use chatflow_types::config::ProviderSettings;
use chatflow_types::error::ConfigError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{custom, preset};

/// Create a [`BoxLlmProvider`] from provider settings and a resolved key.
///
/// An explicit `base_url` always wins; otherwise the provider name must be
/// one of the known presets. A custom backend must name its model.
pub fn create_provider(
    settings: &ProviderSettings,
    api_key: SecretString,
) -> Result<BoxLlmProvider, ConfigError> {
    let model = settings.resolved_model();
    let config = match settings.base_url.as_deref() {
        Some(base_url) => {
            let model = model.ok_or_else(|| ConfigError::MissingModel(settings.name.clone()))?;
            custom(&settings.name, base_url, api_key, model)
        }
        None => model
            .and_then(|model| preset(&settings.name, api_key, model))
            .ok_or_else(|| ConfigError::UnknownProvider(settings.name.clone()))?,
    };

    tracing::debug!(
        provider = %config.provider_name,
        base_url = %config.base_url,
        model = %config.model,
        "creating generation backend"
    );
    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SecretString {
        SecretString::from("test-key".to_string())
    }

    #[test]
    fn test_create_provider_default_is_gemini() {
        let provider = create_provider(&ProviderSettings::default(), key()).unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn test_create_provider_by_preset_name() {
        for (name, model, env) in [
            ("openai", "gpt-4o-mini", "OPENAI_API_KEY"),
            ("mistral", "mistral-large-latest", "MISTRAL_API_KEY"),
        ] {
            let settings = ProviderSettings {
                name: name.to_string(),
                ..Default::default()
            };
            assert_eq!(create_provider(&settings, key()).unwrap().name(), name);
            assert_eq!(settings.resolved_model(), Some(model));
            assert_eq!(settings.resolved_api_key_env(), env);

            let config = preset(name, key(), settings.resolved_model().unwrap()).unwrap();
            assert_eq!(config.model, model);
        }
    }

    #[test]
    fn test_create_provider_with_base_url() {
        let settings = ProviderSettings {
            name: "local-llama".to_string(),
            base_url: Some("http://localhost:8080/v1".to_string()),
            model: Some("llama3".to_string()),
            ..Default::default()
        };
        let provider = create_provider(&settings, key()).unwrap();
        assert_eq!(provider.name(), "local-llama");
    }

    #[test]
    fn test_create_provider_custom_without_model() {
        let settings = ProviderSettings {
            name: "local-llama".to_string(),
            base_url: Some("http://localhost:8080/v1".to_string()),
            ..Default::default()
        };
        let err = create_provider(&settings, key()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingModel(name) if name == "local-llama"));
    }

    #[test]
    fn test_create_provider_unknown_without_base_url() {
        let settings = ProviderSettings {
            name: "local-llama".to_string(),
            ..Default::default()
        };
        let err = create_provider(&settings, key()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(_)));
    }
}
