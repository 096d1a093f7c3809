//! Markdown documents and their discovery on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::MARKDOWN_EXTENSION;
use crate::error::{ChunkerError, Result};

/// An immutable, named sequence of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    lines: Vec<String>,
}

impl Document {
    /// Create a document from its full text.
    ///
    /// Lines are split on `\n`; a trailing newline produces a final empty
    /// line, so [`Document::text`] gives back the input unchanged. The empty
    /// string has no lines.
    ///
    /// # Examples
    /// ```
    /// use mdindex_chunker::Document;
    ///
    /// let doc = Document::from_text("notes.md", "# Notes\nfirst\n");
    /// assert_eq!(doc.lines(), ["# Notes", "first", ""]);
    /// assert_eq!(doc.text(), "# Notes\nfirst\n");
    /// assert!(Document::from_text("empty.md", "").is_empty());
    /// ```
    #[must_use]
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Create a document from already-split lines.
    #[must_use]
    pub fn from_lines(
        name: impl Into<String>,
        lines: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a document from disk, named after its file name.
    pub fn load(path: &Path) -> Result<Self> {
        let name = document_name(path);
        let bytes = fs::read(path).map_err(|e| ChunkerError::input(&name, e))?;
        let text = String::from_utf8(bytes).map_err(|e| ChunkerError::input(&name, e))?;
        tracing::debug!(document = %name, bytes = text.len(), "Loaded document");
        Ok(Self::from_text(name, &text))
    }

    /// Document name (file name for loaded documents).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All lines in order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Reassemble the original text.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// File name of a path, falling back to the full path for odd inputs.
fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// List the Markdown files directly inside `dir`, sorted by file name.
///
/// Sorting keeps batch output independent of directory iteration order.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ChunkerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Documents directory does not exist: {}", dir.display()),
        )));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_markdown = path
            .extension()
            .is_some_and(|ext| ext == MARKDOWN_EXTENSION);
        if path.is_file() && is_markdown {
            paths.push(path);
        }
    }
    paths.sort();

    tracing::debug!(dir = %dir.display(), count = paths.len(), "Discovered documents");
    Ok(paths)
}
