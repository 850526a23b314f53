//! Error types used throughout the application

use thiserror::Error;

/// Main error type for ClassBatch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassBatchError {
    /// Credential acquisition was refused or failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The remote API answered with a non-success status.
    #[error("API call failed: {status} {status_text}")]
    Api { status: u16, status_text: String },

    /// File transfer to storage failed.
    #[error("File upload failed: {0}")]
    Upload(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClassBatchError {
    /// Build an API error from a status code and its reason phrase.
    pub fn api(status: u16, status_text: impl Into<String>) -> Self {
        Self::Api { status, status_text: status_text.into() }
    }

    /// Whether this error means no credential is available.
    ///
    /// Batches stop at the first such error since no later target can
    /// succeed without a credential.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for ClassBatch operations
pub type Result<T> = std::result::Result<T, ClassBatchError>;
