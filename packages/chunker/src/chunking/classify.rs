//! Structural classification of single Markdown lines.
//!
//! The classifier never looks behind: every decision depends on the line
//! itself and, for Setext headers, the line directly below it.

use regex::Regex;
use serde::Serialize;

use crate::config::ClassifierConfig;
use crate::error::{ChunkerError, Result};

/// Character that marks a table row.
const TABLE_DELIMITER: char = '|';

/// The two header syntaxes Markdown supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderKind {
    /// `# Title`
    Atx,
    /// `Title` underlined with `===` or `---`.
    Setext,
}

/// A header found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderLine {
    /// 0-based line index.
    pub index: usize,
    /// The header line as written.
    pub text: String,
    /// Syntax of the header.
    pub kind: HeaderKind,
}

/// Recognizes headers, code fences and table rows.
#[derive(Debug, Clone)]
pub struct Classifier {
    atx: Regex,
    setext_underline: Regex,
    fence_marker: String,
}

impl Classifier {
    /// Compile a classifier from its configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        if config.fence_marker.trim().is_empty() {
            return Err(ChunkerError::InvalidConfig(
                "code-fence marker must not be empty".to_string(),
            ));
        }
        Ok(Self {
            atx: Regex::new(&config.atx_pattern)?,
            setext_underline: Regex::new(&config.setext_underline_pattern)?,
            fence_marker: config.fence_marker.trim().to_string(),
        })
    }

    /// Whether `line` is a header, given the line below it (if any).
    ///
    /// # Examples
    /// ```
    /// use mdindex_chunker::Classifier;
    ///
    /// let classifier = Classifier::default();
    /// assert!(classifier.is_header("## Install", None));
    /// assert!(classifier.is_header("Install", Some("=======")));
    /// assert!(!classifier.is_header("Install", None));
    /// ```
    #[must_use]
    pub fn is_header(&self, line: &str, next_line: Option<&str>) -> bool {
        self.header_kind(line, next_line).is_some()
    }

    /// Header syntax of `line`, if it is a header. ATX wins over Setext.
    #[must_use]
    pub fn header_kind(&self, line: &str, next_line: Option<&str>) -> Option<HeaderKind> {
        if self.atx.is_match(line) {
            return Some(HeaderKind::Atx);
        }
        let next_line = next_line?;
        if !line.trim().is_empty() && self.setext_underline.is_match(next_line.trim()) {
            return Some(HeaderKind::Setext);
        }
        None
    }

    /// Whether `line` opens or closes a fenced code block.
    #[must_use]
    pub fn is_code_fence_delimiter(&self, line: &str) -> bool {
        line.trim_start().starts_with(&self.fence_marker)
    }

    /// Whether `line` looks like a table row.
    ///
    /// Code-block context is tracked by the partitioner, which only asks
    /// this for lines outside a code block.
    #[must_use]
    pub fn is_table_row(&self, line: &str) -> bool {
        line.contains(TABLE_DELIMITER)
    }

    /// All headers in `lines`, skipping fenced code blocks.
    #[must_use]
    pub fn outline<S: AsRef<str>>(&self, lines: &[S]) -> Vec<HeaderLine> {
        let mut headers = Vec::new();
        let mut in_code = false;
        let mut underline = false;

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if std::mem::take(&mut underline) {
                continue;
            }
            if self.is_code_fence_delimiter(line) {
                in_code = !in_code;
                continue;
            }
            if in_code || self.is_table_row(line) {
                continue;
            }
            let next = lines.get(index + 1).map(AsRef::as_ref);
            if let Some(kind) = self.header_kind(line, next) {
                underline = kind == HeaderKind::Setext;
                headers.push(HeaderLine {
                    index,
                    text: line.to_string(),
                    kind,
                });
            }
        }

        headers
    }
}

impl Default for Classifier {
    fn default() -> Self {
        #[allow(clippy::expect_used)] // Built-in patterns that are guaranteed to be valid
        Self::new(&ClassifierConfig::default()).expect("valid default patterns")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atx_headers() {
        let c = Classifier::default();
        assert!(c.is_header("# Title", None));
        assert!(c.is_header("###### Deep", None));
        assert!(c.is_header("#NoSpace", None));
        assert!(c.is_header("##", None)); // second '#' counts as text
        assert!(!c.is_header("#", None));
        assert!(!c.is_header(" # indented", None));
        assert!(!c.is_header("Plain text", None));
        assert_eq!(c.header_kind("# Title", Some("===")), Some(HeaderKind::Atx));
    }

    #[test]
    fn test_setext_headers() {
        let c = Classifier::default();
        assert!(c.is_header("Title", Some("===")));
        assert!(c.is_header("Title", Some("-----")));
        assert!(c.is_header("Title", Some("  ===  ")));
        assert_eq!(c.header_kind("Title", Some("---")), Some(HeaderKind::Setext));
    }

    #[test]
    fn test_setext_requires_text_and_full_underline() {
        let c = Classifier::default();
        assert!(!c.is_header("", Some("===")));
        assert!(!c.is_header("   ", Some("---")));
        assert!(!c.is_header("Title", Some("==")));
        assert!(!c.is_header("Title", Some("=-=")));
        assert!(!c.is_header("Title", Some("--- text")));
        assert!(!c.is_header("Title", None));
    }

    #[test]
    fn test_custom_setext_underline_pattern() {
        let config = ClassifierConfig::default().with_setext_underline_pattern(r"^={3,}$");
        let c = Classifier::new(&config).unwrap();
        assert!(c.is_header("Title", Some("===")));
        assert!(!c.is_header("Title", Some("---")));
        assert!(c.is_header("# Still ATX", Some("---")));
    }

    #[test]
    fn test_invalid_setext_underline_pattern() {
        let config = ClassifierConfig::default().with_setext_underline_pattern("[");
        assert!(matches!(
            Classifier::new(&config),
            Err(ChunkerError::Pattern(_))
        ));
    }

    #[test]
    fn test_header_line_serializes() {
        let header = HeaderLine {
            index: 4,
            text: "Setup".to_string(),
            kind: HeaderKind::Setext,
        };
        assert_eq!(
            serde_json::to_string(&header).unwrap(),
            r#"{"index":4,"text":"Setup","kind":"setext"}"#
        );
    }

    #[test]
    fn test_code_fence_delimiter() {
        let c = Classifier::default();
        assert!(c.is_code_fence_delimiter("```"));
        assert!(c.is_code_fence_delimiter("```python"));
        assert!(c.is_code_fence_delimiter("   ```"));
        assert!(!c.is_code_fence_delimiter("text ```"));
        assert!(!c.is_code_fence_delimiter("``"));
    }

    #[test]
    fn test_custom_fence_marker() {
        let config = ClassifierConfig::default().with_fence_marker("~~~");
        let c = Classifier::new(&config).unwrap();
        assert!(c.is_code_fence_delimiter("~~~rust"));
        assert!(!c.is_code_fence_delimiter("```"));
    }

    #[test]
    fn test_table_row() {
        let c = Classifier::default();
        assert!(c.is_table_row("| a | b |"));
        assert!(c.is_table_row("a | b"));
        assert!(!c.is_table_row("no pipes here"));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = ClassifierConfig::default().with_atx_pattern("(unclosed");
        assert!(matches!(
            Classifier::new(&config),
            Err(ChunkerError::Pattern(_))
        ));
    }

    #[test]
    fn test_outline_skips_code_and_tables() {
        let c = Classifier::default();
        let lines = [
            "# Title",
            "```",
            "# not a header",
            "```",
            "| # | col |",
            "Sub",
            "---",
        ];
        let outline = c.outline(&lines);
        assert_eq!(
            outline,
            vec![
                HeaderLine {
                    index: 0,
                    text: "# Title".to_string(),
                    kind: HeaderKind::Atx,
                },
                HeaderLine {
                    index: 5,
                    text: "Sub".to_string(),
                    kind: HeaderKind::Setext,
                },
            ]
        );
    }
}
