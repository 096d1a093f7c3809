//! Token-length capabilities used by the segmenter.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::Result;

/// Counts tokens in a single line of text.
///
/// Implementations must be deterministic: the same text always yields the
/// same count. They are shared across worker threads, hence `Send + Sync`.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`.
    fn token_length(&self, text: &str) -> Result<usize>;
}

impl<T: TokenCounter + ?Sized> TokenCounter for &T {
    fn token_length(&self, text: &str) -> Result<usize> {
        (**self).token_length(text)
    }
}

impl<T: TokenCounter + ?Sized> TokenCounter for Box<T> {
    fn token_length(&self, text: &str) -> Result<usize> {
        (**self).token_length(text)
    }
}

impl<T: TokenCounter + ?Sized> TokenCounter for Arc<T> {
    fn token_length(&self, text: &str) -> Result<usize> {
        (**self).token_length(text)
    }
}

/// Word runs and single punctuation characters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|[^\w\s]").expect("valid regex"));

/// Approximates a word-piece tokenizer's pre-tokenization: every run of word
/// characters and every punctuation character counts as one token.
///
/// # Examples
/// ```
/// use mdindex_chunker::{TokenCounter, WordTokenCounter};
///
/// assert_eq!(WordTokenCounter.token_length("Hello, world!").unwrap(), 4);
/// assert_eq!(WordTokenCounter.token_length("").unwrap(), 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenCounter;

impl TokenCounter for WordTokenCounter {
    fn token_length(&self, text: &str) -> Result<usize> {
        Ok(WORD_TOKEN.find_iter(text).count())
    }
}

#[cfg(feature = "hf-tokenizer")]
pub use hf::HfTokenCounter;

#[cfg(feature = "hf-tokenizer")]
mod hf {
    use std::path::Path;

    use tokenizers::Tokenizer;

    use super::TokenCounter;
    use crate::error::{ChunkerError, Result};

    /// Counts tokens with a Hugging Face tokenizer loaded from `tokenizer.json`.
    pub struct HfTokenCounter {
        tokenizer: Tokenizer,
    }

    impl HfTokenCounter {
        /// Load a tokenizer definition from disk.
        pub fn from_file(path: &Path) -> Result<Self> {
            let tokenizer = Tokenizer::from_file(path).map_err(|e| {
                ChunkerError::Dependency(format!(
                    "failed to load tokenizer from {}: {e}",
                    path.display()
                ))
            })?;
            tracing::info!(path = %path.display(), "Loaded tokenizer");
            Ok(Self { tokenizer })
        }
    }

    impl TokenCounter for HfTokenCounter {
        fn token_length(&self, text: &str) -> Result<usize> {
            let encoding = self
                .tokenizer
                .encode(text, false)
                .map_err(|e| ChunkerError::Dependency(format!("tokenization failed: {e}")))?;
            Ok(encoding.len())
        }
    }

    impl std::fmt::Debug for HfTokenCounter {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("HfTokenCounter").finish_non_exhaustive()
        }
    }
}
