//! Types shared by the chunking stages.
//!
//! Every intermediate unit is a range of line indices into the document, so
//! stages never copy text and losslessness reduces to range bookkeeping.

use std::ops::Range;

use serde::Serialize;

/// Structural kind of a run of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    /// Fenced code block, fences included.
    Code,
    /// Contiguous table rows.
    Table,
    /// Anything else: paragraphs, headers, lists.
    Prose,
}

impl RunKind {
    /// Whether runs of this kind are emitted as a single unsplit chunk.
    #[must_use]
    pub fn is_atomic(self) -> bool {
        matches!(self, Self::Code | Self::Table)
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Table => "table",
            Self::Prose => "prose",
        }
    }
}

/// A contiguous span of a document sharing one structural kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Kind of every line in the run.
    pub kind: RunKind,
    /// Line indices covered by the run.
    pub lines: Range<usize>,
}

impl Run {
    /// Create a run.
    #[must_use]
    pub fn new(kind: RunKind, lines: Range<usize>) -> Self {
        Self { kind, lines }
    }
}

/// A token-bounded group of lines produced by the segmenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Line indices covered by the segment.
    pub lines: Range<usize>,
    /// Sum of the per-line token lengths.
    pub tokens: usize,
}

/// The externally visible unit of pipeline output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkRecord {
    /// Name of the source document.
    pub document: String,

    /// 1-based ordinal of the structural unit (run or section) in the document.
    pub outer: usize,

    /// 1-based ordinal of the chunk within its unit.
    pub inner: usize,

    /// 1-based running chunk number within the document.
    pub sequence: usize,

    /// Structural kind of the unit the chunk came from.
    pub kind: RunKind,

    /// First line (0-based, inclusive).
    pub start_line: usize,

    /// Last line (0-based, exclusive).
    pub end_line: usize,

    /// Summed token count for prose chunks; code and tables are not counted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,

    /// Chunk text: the lines joined by `\n`.
    pub content: String,
}

impl ChunkRecord {
    /// Deterministic file name for this chunk.
    ///
    /// # Examples
    /// ```
    /// use mdindex_chunker::{ChunkRecord, RunKind};
    ///
    /// let record = ChunkRecord {
    ///     document: "guide.md".to_string(),
    ///     outer: 2,
    ///     inner: 1,
    ///     sequence: 3,
    ///     kind: RunKind::Prose,
    ///     start_line: 4,
    ///     end_line: 9,
    ///     token_count: Some(42),
    ///     content: "text".to_string(),
    /// };
    /// assert_eq!(record.file_name(), "guide.md_chunk_2_1.md");
    /// ```
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_chunk_{}_{}.md", self.document, self.outer, self.inner)
    }

    /// Number of lines in the chunk.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// Join a range of lines into chunk text.
#[must_use]
pub fn join_lines(lines: &[String], range: Range<usize>) -> String {
    lines[range].join("\n")
}
