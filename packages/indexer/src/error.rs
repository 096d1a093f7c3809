//! Error types for the indexer.

use thiserror::Error;

/// Main error type for the indexer library.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Store returned {status}: {body}")]
    Store { status: u16, body: String },

    /// Transient failures persisted through every retry.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// The store answered with something we could not interpret.
    #[error("Failed to parse store response: {0}")]
    ResponseParse(String),

    /// Chunking failed.
    #[error(transparent)]
    Chunker(#[from] mdindex_chunker::ChunkerError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for IndexerError {
    fn from(e: serde_json::Error) -> Self {
        Self::ResponseParse(e.to_string())
    }
}

/// Result type alias for indexer operations.
pub type Result<T> = std::result::Result<T, IndexerError>;
