//! Environment configuration for the store client and the ingest run.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use mdindex_chunker::config::default_workers;
use mdindex_chunker::{ChunkerConfig, DEFAULT_TOKEN_BUDGET};

use crate::error::{IndexerError, Result};

/// Class that holds chunk objects unless `WEAVIATE_CLASS` says otherwise.
pub const DEFAULT_CLASS_NAME: &str = "Chunks";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Directory scanned for Markdown documents.
pub const DEFAULT_DOCUMENTS_DIR: &str = "./documents";

/// Directory chunk files are written to.
pub const DEFAULT_CHUNKS_DIR: &str = "./chunks";

/// Page size used when listing object ids.
pub const QUERY_PAGE_SIZE: usize = 100;

/// Load a `.env` file from the working directory, if there is one.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Connection settings for the vector store.
///
/// `Debug` is implemented by hand so the API token never reaches logs.
#[derive(Clone)]
pub struct StoreConfig {
    /// Base URL of the REST API, e.g. `http://localhost:8080/v1`.
    pub api_url: String,
    /// Bearer token sent with every request.
    pub api_token: String,
    /// Class chunk objects are written to and deleted from.
    pub class_name: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Read `WEAVIATE_API_URL`, `WEAVIATE_API_TOKEN`, `WEAVIATE_CLASS` and
    /// `WEAVIATE_TIMEOUT_SECS` from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("WEAVIATE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| IndexerError::Config("WEAVIATE_API_URL not set".into()))?;

        let api_token = lookup("WEAVIATE_API_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| IndexerError::Config("WEAVIATE_API_TOKEN not set".into()))?;

        let class_name = lookup("WEAVIATE_CLASS").unwrap_or_else(|| DEFAULT_CLASS_NAME.into());

        let timeout_secs =
            parse_var(&lookup, "WEAVIATE_TIMEOUT_SECS")?.unwrap_or(HTTP_TIMEOUT_SECS);

        Ok(Self::new(api_url, api_token)
            .with_class_name(class_name)
            .with_timeout_secs(timeout_secs))
    }

    /// Settings for `api_url` and `api_token` with the default class and
    /// timeout. A trailing `/` on the URL is dropped.
    pub fn new(api_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            class_name: DEFAULT_CLASS_NAME.to_string(),
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }

    /// Use a different class for chunk objects.
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("class_name", &self.class_name)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Settings for chunking a documents directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Directory scanned for `.md` files.
    pub documents_dir: PathBuf,
    /// Directory chunk files are written to.
    pub chunks_dir: PathBuf,
    /// Maximum tokens per prose chunk.
    pub token_budget: usize,
    /// Worker threads for chunking.
    pub workers: usize,
    /// `tokenizer.json` used for token counting when the `hf-tokenizer`
    /// feature is enabled.
    pub tokenizer_path: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            documents_dir: DEFAULT_DOCUMENTS_DIR.into(),
            chunks_dir: DEFAULT_CHUNKS_DIR.into(),
            token_budget: DEFAULT_TOKEN_BUDGET,
            workers: default_workers(),
            tokenizer_path: None,
        }
    }
}

impl IngestConfig {
    /// Read `DOCUMENTS_DIR`, `CHUNKS_DIR`, `CHUNK_TOKEN_BUDGET`,
    /// `CHUNK_WORKERS` and `TOKENIZER_PATH`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            documents_dir: lookup("DOCUMENTS_DIR").map_or(defaults.documents_dir, PathBuf::from),
            chunks_dir: lookup("CHUNKS_DIR").map_or(defaults.chunks_dir, PathBuf::from),
            token_budget: parse_var(&lookup, "CHUNK_TOKEN_BUDGET")?
                .unwrap_or(defaults.token_budget),
            workers: parse_var(&lookup, "CHUNK_WORKERS")?.unwrap_or(defaults.workers),
            tokenizer_path: lookup("TOKENIZER_PATH").map(PathBuf::from),
        })
    }

    /// Chunker configuration for this run. Validation happens when the
    /// pipeline is built.
    #[must_use]
    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig::new(self.token_budget).with_workers(self.workers)
    }
}

/// Parse an optional variable; a value that is set but malformed is an error.
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| IndexerError::Config(format!("{key} is not a valid number: '{raw}'"))),
    }
}
