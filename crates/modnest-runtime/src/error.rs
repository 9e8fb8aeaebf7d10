//! Error types for the Modnest runtime.

use thiserror::Error;

/// Errors that can occur while handling module metadata.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The byte stream is not a parseable module.
    #[error("malformed module resource: {0}")]
    MalformedModule(String),

    /// A module request string could not be parsed into an identity.
    #[error("invalid module identity: {0}")]
    InvalidIdentity(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
