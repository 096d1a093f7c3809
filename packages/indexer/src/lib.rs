//! mdindex indexer - Load chunked Markdown documents into a vector store.
//!
//! Builds on [`mdindex_chunker`]: documents are chunked there, and this crate
//! manages the store side (class schema, object upload, bulk deletion) plus
//! the `mdindex` command-line tool.
//!
//! # Example
//!
//! ```
//! use mdindex_indexer::schema::chunks_class_schema;
//! use mdindex_indexer::store::ids_query;
//!
//! let schema = chunks_class_schema("Chunks");
//! assert_eq!(schema.properties.len(), 3);
//! assert!(ids_query("Chunks", 10, None).contains("Chunks(limit: 10)"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Environment configuration
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client with retries
//! - [`schema`]: Class schema definitions
//! - [`store`]: Vector store trait and Weaviate client
//! - [`ingest`]: Batch upload, deletion and schema setup
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod ingest;
pub mod schema;
pub mod store;

pub use config::{IngestConfig, StoreConfig};
pub use error::{IndexerError, Result};
pub use ingest::{create_schema, delete_all, ingest_paths, upload_records, BatchReport};
pub use store::{VectorStore, WeaviateClient};
