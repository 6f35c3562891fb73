use thiserror::Error;

/// Errors from client-local key-value storage.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Errors related to session identifier handling.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("invalid session id: '{0}'")]
    InvalidId(String),
}

/// Errors loading the deployment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("unknown provider '{0}' and no base_url configured")]
    UnknownProvider(String),

    #[error("no model configured for provider '{0}'")]
    MissingModel(String),
}

/// Errors loading the intent response table.
#[derive(Debug, Error)]
pub enum IntentTableError {
    #[error("intent table not found at {0}")]
    NotFound(String),

    #[error("failed to read intent table: {0}")]
    Io(String),

    #[error("invalid intent table: {0}")]
    Invalid(String),
}
