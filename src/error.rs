//! Error types for workshop-tracker.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or empty.
    #[error("validation: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The write would break a uniqueness rule (duplicate incident, busy machine).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short label used for metric attributes.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "invalid",
            Error::Conflict(_) => "conflict",
            Error::NotFound(_) => "not_found",
            Error::Storage(_) | Error::Config(_) | Error::Other(_) => "error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
