//! Configuration constants and validation for the chunker.

use std::num::NonZeroUsize;

use crate::error::{ChunkerError, Result};

/// Default maximum number of tokens per prose chunk.
pub const DEFAULT_TOKEN_BUDGET: usize = 300;

/// Default code-fence marker (three backticks).
pub const DEFAULT_FENCE_MARKER: &str = "```";

/// ATX header: one or more `#` at line start, optional whitespace, then text.
pub const DEFAULT_ATX_PATTERN: &str = r"^#+\s*(.+)$";

/// Setext underline, matched against the trimmed line below a header.
pub const DEFAULT_SETEXT_UNDERLINE_PATTERN: &str = r"^(={3,}|-{3,})$";

/// File extension of documents picked up by directory discovery.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Patterns the structural classifier recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Regex matched against a single line to detect ATX headers.
    pub atx_pattern: String,

    /// Regex matched against the trimmed next line to detect Setext underlines.
    pub setext_underline_pattern: String,

    /// Prefix (after optional leading whitespace) that opens or closes a code block.
    pub fence_marker: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            atx_pattern: DEFAULT_ATX_PATTERN.to_string(),
            setext_underline_pattern: DEFAULT_SETEXT_UNDERLINE_PATTERN.to_string(),
            fence_marker: DEFAULT_FENCE_MARKER.to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Set the ATX header pattern.
    #[must_use]
    pub fn with_atx_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.atx_pattern = pattern.into();
        self
    }

    /// Set the Setext underline pattern.
    #[must_use]
    pub fn with_setext_underline_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.setext_underline_pattern = pattern.into();
        self
    }

    /// Set the code-fence marker.
    #[must_use]
    pub fn with_fence_marker(mut self, marker: impl Into<String>) -> Self {
        self.fence_marker = marker.into();
        self
    }
}

/// Everything the pipeline needs besides the token counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Header and fence patterns.
    pub classifier: ClassifierConfig,

    /// Soft ceiling on the summed per-line token count of a prose chunk.
    pub token_budget: usize,

    /// Number of worker threads used for batches of documents.
    pub workers: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            token_budget: DEFAULT_TOKEN_BUDGET,
            workers: default_workers(),
        }
    }
}

impl ChunkerConfig {
    /// Create a configuration with the given token budget and defaults otherwise.
    #[must_use]
    pub fn new(token_budget: usize) -> Self {
        Self {
            token_budget,
            ..Self::default()
        }
    }

    /// Set the classifier configuration.
    #[must_use]
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the token budget.
    #[must_use]
    pub fn with_token_budget(mut self, token_budget: usize) -> Self {
        self.token_budget = token_budget;
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Check the configuration before building a pipeline from it.
    pub fn validate(&self) -> Result<()> {
        validate_token_budget(self.token_budget)?;
        if self.workers == 0 {
            return Err(ChunkerError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.classifier.fence_marker.trim().is_empty() {
            return Err(ChunkerError::InvalidConfig(
                "code-fence marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validate a token budget.
///
/// # Examples
/// ```
/// use mdindex_chunker::config::validate_token_budget;
///
/// assert!(validate_token_budget(300).is_ok());
/// assert!(validate_token_budget(0).is_err());
/// ```
pub fn validate_token_budget(token_budget: usize) -> Result<()> {
    if token_budget == 0 {
        return Err(ChunkerError::InvalidConfig(
            "token budget must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Worker count used when none is configured: the available parallelism.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
