use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to get a valid response from the AI: {reason}")]
    GenerationFailed { reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Clipboard error: {message}")]
    Clipboard { message: String },

    #[error("Export failed: {message}")]
    Export { message: String },

    #[error("Unknown strategy: {id}")]
    UnknownStrategy { id: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Serialization failed for '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Model gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gemini API key is not configured. Cannot make API calls.")]
    NotConfigured,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while turning model JSON into typed reply results
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected shape: {message}")]
    Shape { message: String },

    #[error("expected {expected} {what}, got {actual}")]
    WrongCount {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("strategy '{name}' appears more than once in the comparison")]
    DuplicateStrategy { name: String },

    #[error("best strategy '{best}' does not match any compared strategy")]
    UnknownBest { best: String },
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotConfigured => AppError::Config {
                message: GatewayError::NotConfigured.to_string(),
            },
            other => AppError::GenerationFailed {
                reason: other.to_string(),
            },
        }
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::GenerationFailed {
            reason: format!("Malformed response: {}", err),
        }
    }
}

impl AppError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
