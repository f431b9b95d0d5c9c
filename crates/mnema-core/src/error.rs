//! Error types for mnema.

use thiserror::Error;

/// Result type alias using mnema's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mnema operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(uuid::Uuid),

    /// Quiz not found
    #[error("Quiz not found: {0}")]
    QuizNotFound(uuid::Uuid),

    /// LLM or search provider call failed (transport, auth, malformed request)
    #[error("Provider error: {message}")]
    Provider {
        /// Upstream HTTP status, when the provider responded at all.
        status: Option<u16>,
        message: String,
    },

    /// Every candidate in the model/key fallback chain failed on quota.
    /// Carries the first observed failure for reporting.
    #[error("Provider quota exhausted: {message}")]
    QuotaExhausted {
        /// Upstream HTTP status of the first quota-shaped failure.
        status: Option<u16>,
        message: String,
    },

    /// Provider returned 200 but the text held no usable JSON object
    #[error("Parse error: {0}")]
    Parse(String),

    /// Parsed JSON violates cardinality or enum constraints
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Machine-checkable error code for caller-visible responses.
    ///
    /// Callers use this to distinguish "try again later" (quota) from
    /// "this input could not be processed" (parse/validation) from an
    /// internal fault.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Database(_) => "DATABASE_ERROR",
            Error::NoteNotFound(_) | Error::QuizNotFound(_) => "NOT_FOUND",
            Error::Provider { .. } => "PROVIDER_ERROR",
            Error::QuotaExhausted { .. } => "QUOTA_EXHAUSTED",
            Error::Parse(_) => "PARSE_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Request(_) => "REQUEST_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::Internal(_) => "INTERNAL_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// Upstream provider HTTP status, when one was observed.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            Error::Provider { status, .. } | Error::QuotaExhausted { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
