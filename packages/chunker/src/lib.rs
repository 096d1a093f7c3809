//! mdindex chunker - Split Markdown documents into chunks for vector search.
//!
//! Documents are split along their structure (code blocks, tables, header
//! sections) and prose is further bounded by a token budget. The output is
//! deterministic and lossless: every line of a document lands in exactly one
//! chunk, in order.
//!
//! # Example
//!
//! ```
//! use mdindex_chunker::{ChunkPipeline, ChunkerConfig, Document, WordTokenCounter};
//!
//! let config = ChunkerConfig::new(300).with_workers(1);
//! let pipeline = ChunkPipeline::new(&config, WordTokenCounter).unwrap();
//!
//! let doc = Document::from_text("intro.md", "# Intro\nHello.\n## Next\nMore.");
//! let records = pipeline.chunk_document(&doc).unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].content, "# Intro\nHello.");
//! assert_eq!(records[1].file_name(), "intro.md_chunk_2_1.md");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`error`]: Error types and Result alias
//! - [`document`]: Documents and Markdown file discovery
//! - [`token`]: Token-length capabilities
//! - [`chunking`]: Classifier, partitioner, sections, segmenter and pipeline
//! - [`output`]: Chunk files and JSON lines

pub mod chunking;
pub mod config;
pub mod document;
pub mod error;
pub mod output;
pub mod token;

pub use chunking::{
    BatchOutput, ChunkPipeline, ChunkRecord, Classifier, DocumentFailure, HeaderKind, HeaderLine,
    RunKind,
};
pub use config::{ChunkerConfig, ClassifierConfig, DEFAULT_TOKEN_BUDGET};
pub use document::{discover_documents, Document};
pub use error::{ChunkerError, Result};
pub use output::{write_chunk_files, write_json_lines};
pub use token::{TokenCounter, WordTokenCounter};

#[cfg(feature = "hf-tokenizer")]
pub use token::HfTokenCounter;
