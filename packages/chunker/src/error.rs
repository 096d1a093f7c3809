//! Error types for the chunker.
//!
//! Every failure the pipeline can report is a `ChunkerError`. Input failures
//! are scoped to a single document so batch callers can skip it and continue.

use thiserror::Error;

/// Main error type for the chunker library.
#[derive(Debug, Error)]
pub enum ChunkerError {
    /// A document could not be read or is not valid text.
    #[error("Failed to read document '{document}': {message}")]
    Input { document: String, message: String },

    /// The token-length capability failed.
    #[error("Token counter failed: {0}")]
    Dependency(String),

    /// Invalid chunker configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid header pattern.
    #[error("Invalid header pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChunkerError {
    /// Build an input error for the named document.
    pub fn input(document: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Input {
            document: document.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for chunker operations.
pub type Result<T> = std::result::Result<T, ChunkerError>;
