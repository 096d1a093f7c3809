//! Chunk pipeline that composes partitioning, header splitting, merging and
//! segmentation, and numbers the resulting chunks.

use std::ops::Range;
use std::path::PathBuf;

use rayon::prelude::*;
use rayon::ThreadPool;

use super::classify::Classifier;
use super::partition::partition;
use super::sections::{merge_header_only, split_by_headers};
use super::segment::segment;
use super::types::{join_lines, ChunkRecord, Run, RunKind, Segment};
use crate::config::ChunkerConfig;
use crate::document::Document;
use crate::error::{ChunkerError, Result};
use crate::token::TokenCounter;

/// A structural unit: an atomic code/table run or a merged prose section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Kind of the unit.
    pub kind: RunKind,
    /// Line indices covered by the unit.
    pub lines: Range<usize>,
}

/// A document the batch could not chunk.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Document name.
    pub document: String,
    /// Why it failed.
    pub error: ChunkerError,
}

/// Output of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutput {
    /// Records of every successful document, in input order.
    pub records: Vec<ChunkRecord>,
    /// Number of documents chunked successfully.
    pub documents: usize,
    /// Documents that were skipped.
    pub failures: Vec<DocumentFailure>,
}

impl BatchOutput {
    fn collect(results: Vec<(String, Result<Vec<ChunkRecord>>)>) -> Self {
        let mut output = Self::default();
        for (document, result) in results {
            match result {
                Ok(records) => {
                    output.documents += 1;
                    output.records.extend(records);
                }
                Err(error) => {
                    tracing::warn!(document = %document, error = %error, "Skipping document");
                    output.failures.push(DocumentFailure { document, error });
                }
            }
        }
        tracing::info!(
            documents = output.documents,
            chunks = output.records.len(),
            failed = output.failures.len(),
            "Chunked batch"
        );
        output
    }
}

/// Turns documents into ordered chunk records.
pub struct ChunkPipeline<T: TokenCounter> {
    classifier: Classifier,
    token_budget: usize,
    counter: T,
    pool: ThreadPool,
}

impl<T: TokenCounter> ChunkPipeline<T> {
    /// Create a pipeline from configuration and a token counter.
    pub fn new(config: &ChunkerConfig, counter: T) -> Result<Self> {
        config.validate()?;
        let classifier = Classifier::new(&config.classifier)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("mdindex-chunker-{i}"))
            .build()
            .map_err(|e| ChunkerError::InvalidConfig(format!("failed to build worker pool: {e}")))?;

        Ok(Self {
            classifier,
            token_budget: config.token_budget,
            counter,
            pool,
        })
    }

    /// The classifier this pipeline uses.
    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Configured token budget.
    #[must_use]
    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Structural units of a document, in order.
    ///
    /// Code and table runs are units on their own. Consecutive prose runs
    /// are split at headers and merged as one group, so header-only sections
    /// from adjacent runs still merge together.
    #[must_use]
    pub fn units(&self, document: &Document) -> Vec<Unit> {
        let lines = document.lines();
        let runs = partition(&self.classifier, lines);

        let mut units = Vec::new();
        let mut prose: Vec<Range<usize>> = Vec::new();

        for Run { kind, lines: range } in runs {
            if kind == RunKind::Prose {
                prose.extend(split_by_headers(&self.classifier, lines, range));
                continue;
            }
            self.flush_prose(lines, &mut prose, &mut units);
            units.push(Unit { kind, lines: range });
        }
        self.flush_prose(lines, &mut prose, &mut units);

        units
    }

    fn flush_prose(&self, lines: &[String], prose: &mut Vec<Range<usize>>, units: &mut Vec<Unit>) {
        if prose.is_empty() {
            return;
        }
        let sections = std::mem::take(prose);
        units.extend(
            merge_header_only(&self.classifier, lines, sections)
                .into_iter()
                .map(|range| Unit {
                    kind: RunKind::Prose,
                    lines: range,
                }),
        );
    }

    /// Chunk a single document.
    ///
    /// Either every chunk of the document is returned or an error; partial
    /// output is never produced.
    pub fn chunk_document(&self, document: &Document) -> Result<Vec<ChunkRecord>> {
        let lines = document.lines();

        if tracing::enabled!(tracing::Level::DEBUG) {
            for header in self.classifier.outline(lines) {
                tracing::debug!(
                    document = %document.name(),
                    line = header.index,
                    header = %header.text.trim(),
                    "Found header"
                );
            }
        }

        let mut records = Vec::new();
        let mut sequence = 0;

        for (unit_index, unit) in self.units(document).into_iter().enumerate() {
            let pieces = if unit.kind.is_atomic() {
                vec![(unit.lines.clone(), None)]
            } else {
                segment(&self.counter, lines, unit.lines.clone(), self.token_budget)?
                    .into_iter()
                    .map(|Segment { lines, tokens }| (lines, Some(tokens)))
                    .collect()
            };

            for (piece_index, (range, token_count)) in pieces.into_iter().enumerate() {
                sequence += 1;
                tracing::trace!(
                    document = %document.name(),
                    sequence,
                    kind = unit.kind.as_str(),
                    start = range.start,
                    end = range.end,
                    "Emitting chunk"
                );
                records.push(ChunkRecord {
                    document: document.name().to_string(),
                    outer: unit_index + 1,
                    inner: piece_index + 1,
                    sequence,
                    kind: unit.kind,
                    start_line: range.start,
                    end_line: range.end,
                    token_count,
                    content: join_lines(lines, range),
                });
            }
        }

        tracing::debug!(
            document = %document.name(),
            lines = lines.len(),
            chunks = records.len(),
            "Chunked document"
        );
        Ok(records)
    }

    /// Chunk many documents on the worker pool.
    ///
    /// Output order follows input order. A failing document is logged,
    /// reported in [`BatchOutput::failures`] and contributes no records.
    pub fn chunk_documents(&self, documents: &[Document]) -> BatchOutput {
        let results = self.pool.install(|| {
            documents
                .par_iter()
                .map(|doc| (doc.name().to_string(), self.chunk_document(doc)))
                .collect::<Vec<_>>()
        });
        BatchOutput::collect(results)
    }

    /// Load and chunk documents from disk on the worker pool.
    ///
    /// Unreadable documents become input failures; the rest of the batch
    /// continues.
    pub fn chunk_paths(&self, paths: &[PathBuf]) -> BatchOutput {
        let results = self.pool.install(|| {
            paths
                .par_iter()
                .map(|path| match Document::load(path) {
                    Ok(doc) => (doc.name().to_string(), self.chunk_document(&doc)),
                    Err(e) => (path.display().to_string(), Err(e)),
                })
                .collect::<Vec<_>>()
        });
        BatchOutput::collect(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::WordTokenCounter;
    use pretty_assertions::assert_eq;

    fn pipeline(budget: usize) -> ChunkPipeline<WordTokenCounter> {
        let config = ChunkerConfig::new(budget).with_workers(2);
        ChunkPipeline::new(&config, WordTokenCounter).unwrap()
    }

    fn contents(records: &[ChunkRecord]) -> Vec<&str> {
        records.iter().map(|r| r.content.as_str()).collect()
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let doc = Document::from_text("empty.md", "");
        assert!(pipeline(300).chunk_document(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_ordinals() {
        let doc = Document::from_lines(
            "a.md",
            ["# One", "alpha beta", "gamma delta", "# Two", "epsilon"],
        );
        let records = pipeline(4).chunk_document(&doc).unwrap();

        let ordinals: Vec<_> = records
            .iter()
            .map(|r| (r.outer, r.inner, r.sequence))
            .collect();
        assert_eq!(ordinals, vec![(1, 1, 1), (1, 2, 2), (2, 1, 3)]);
        assert_eq!(
            contents(&records),
            vec!["# One\nalpha beta", "gamma delta", "# Two\nepsilon"]
        );
    }

    #[test]
    fn test_consecutive_headers_merge_across_runs() {
        let doc = Document::from_lines("a.md", ["# A", "## B", "### C", "text"]);
        let p = pipeline(300);

        let units = p.units(&doc);
        assert_eq!(
            units,
            vec![
                Unit {
                    kind: RunKind::Prose,
                    lines: 0..2
                },
                Unit {
                    kind: RunKind::Prose,
                    lines: 2..4
                },
            ]
        );
    }

    #[test]
    fn test_code_and_table_bypass_budget() {
        let doc = Document::from_lines(
            "a.md",
            [
                "| col a | col b | col c |",
                "|---|---|---|",
                "| one two three | four five | six |",
                "```",
                "let a = one + two + three;",
                "```",
            ],
        );
        let records = pipeline(1).chunk_document(&doc).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, RunKind::Table);
        assert_eq!(records[0].token_count, None);
        assert_eq!(records[1].kind, RunKind::Code);
        assert_eq!((records[1].start_line, records[1].end_line), (3, 6));
    }

    #[test]
    fn test_counter_failure_fails_document() {
        struct Broken;
        impl TokenCounter for Broken {
            fn token_length(&self, _text: &str) -> Result<usize> {
                Err(ChunkerError::Dependency("offline".to_string()))
            }
        }

        let p = ChunkPipeline::new(&ChunkerConfig::new(10).with_workers(1), Broken).unwrap();
        let doc = Document::from_lines("a.md", ["text"]);
        assert!(matches!(
            p.chunk_document(&doc),
            Err(ChunkerError::Dependency(_))
        ));

        // Code never reaches the counter.
        let code = Document::from_lines("b.md", ["```", "x", "```"]);
        assert_eq!(p.chunk_document(&code).unwrap().len(), 1);
    }

    #[test]
    fn test_batch_preserves_order_and_skips_failures() {
        struct FailsOn(&'static str);
        impl TokenCounter for FailsOn {
            fn token_length(&self, text: &str) -> Result<usize> {
                if text.contains(self.0) {
                    Err(ChunkerError::Dependency("poisoned".to_string()))
                } else {
                    Ok(1)
                }
            }
        }

        let p = ChunkPipeline::new(&ChunkerConfig::new(10).with_workers(4), FailsOn("poison"))
            .unwrap();
        let docs: Vec<_> = (0..20)
            .map(|i| {
                let body = if i == 7 { "poison" } else { "fine" };
                Document::from_lines(format!("doc{i:02}.md"), ["# Title", body])
            })
            .collect();

        let output = p.chunk_documents(&docs);
        assert_eq!(output.documents, 19);
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].document, "doc07.md");

        let names: Vec<_> = output.records.iter().map(|r| r.document.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(ChunkPipeline::new(&ChunkerConfig::new(0), WordTokenCounter).is_err());
    }
}
