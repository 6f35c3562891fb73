//! API key resolution from the environment.
//!
//! The configured `api_key_env` variable (or the preset's) is checked first.
//! For the Gemini preset, `GOOGLE_API_KEY` is accepted as a fallback.

use secrecy::SecretString;

use chatflow_types::config::ProviderSettings;
use chatflow_types::error::ConfigError;

const GEMINI_FALLBACK_ENV: &str = "GOOGLE_API_KEY";

/// Resolve the API key for `settings` from process environment variables.
pub fn resolve_api_key(settings: &ProviderSettings) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(settings, |name| std::env::var(name).ok())
}

/// Resolve the API key using `lookup` to read variables.
///
/// Empty values count as unset.
pub fn resolve_api_key_with<F>(settings: &ProviderSettings, lookup: F) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let primary = settings.resolved_api_key_env();
    let mut candidates = vec![primary];
    if settings.name == "gemini" && primary != GEMINI_FALLBACK_ENV {
        candidates.push(GEMINI_FALLBACK_ENV);
    }

    candidates
        .into_iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingApiKey(primary.to_string()))
}
