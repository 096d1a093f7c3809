//! Structure-aware, token-bounded chunking of Markdown documents.
//!
//! The stages run in order: [`partition`] splits a document into code,
//! table and prose runs; [`split_by_headers`] and [`merge_header_only`]
//! turn prose into sections; [`segment`] bounds each prose section by the
//! token budget. [`ChunkPipeline`] composes them and numbers the chunks.

mod classify;
mod engine;
mod partition;
mod sections;
mod segment;
mod types;

pub use classify::{Classifier, HeaderKind, HeaderLine};
pub use engine::{BatchOutput, ChunkPipeline, DocumentFailure, Unit};
pub use partition::{partition, BlockState};
pub use sections::{is_header_only, merge_header_only, split_by_headers, MergeState};
pub use segment::segment;
pub use types::{join_lines, ChunkRecord, Run, RunKind, Segment};
