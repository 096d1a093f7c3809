//! Command-line interface for the indexer.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use mdindex_chunker::{
    discover_documents, write_chunk_files, write_json_lines, BatchOutput, ChunkPipeline,
    Classifier, Document, TokenCounter, WordTokenCounter,
};

use crate::config::{IngestConfig, StoreConfig};
use crate::error::Result;
use crate::ingest::{create_schema, delete_all, ingest_paths, BatchReport};
use crate::schema::chunks_class_schema;
use crate::store::{VectorStore, WeaviateClient};

/// mdindex - Chunk Markdown documents and load them into a vector store.
#[derive(Parser)]
#[command(name = "mdindex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chunk every Markdown file in a directory and write the chunks.
    Chunk {
        /// Directory with .md files (default: $DOCUMENTS_DIR or ./documents)
        #[arg(short, long)]
        documents: Option<PathBuf>,

        /// Output directory (default: $CHUNKS_DIR or ./chunks)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum tokens per prose chunk (default: $CHUNK_TOKEN_BUDGET or 300)
        #[arg(short, long)]
        budget: Option<usize>,

        /// Print chunks as JSON lines instead of writing files
        #[arg(long)]
        json: bool,
    },

    /// Print the headers found in a document.
    Outline {
        /// Markdown file
        file: PathBuf,

        /// Print headers as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Create the chunk class in the store and print it back.
    CreateSchema,

    /// Print the chunk class as the store knows it.
    ShowSchema,

    /// Chunk every Markdown file in a directory and upload the chunks.
    Ingest {
        /// Directory with .md files (default: $DOCUMENTS_DIR or ./documents)
        #[arg(short, long)]
        documents: Option<PathBuf>,

        /// Maximum tokens per prose chunk (default: $CHUNK_TOKEN_BUDGET or 300)
        #[arg(short, long)]
        budget: Option<usize>,
    },

    /// Delete every object of the chunk class.
    DeleteAll,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chunk {
            documents,
            output,
            budget,
            json,
        } => chunk_command(documents, output, budget, json),
        Commands::Outline { file, json } => outline_command(&file, json),
        Commands::CreateSchema => create_schema_command(),
        Commands::ShowSchema => show_schema_command(),
        Commands::Ingest { documents, budget } => ingest_command(documents, budget),
        Commands::DeleteAll => delete_all_command(),
    }
}

/// Environment configuration with command-line overrides applied.
fn ingest_config(
    documents: Option<PathBuf>,
    output: Option<PathBuf>,
    budget: Option<usize>,
) -> Result<IngestConfig> {
    let mut config = IngestConfig::from_env()?;
    if let Some(documents) = documents {
        config.documents_dir = documents;
    }
    if let Some(output) = output {
        config.chunks_dir = output;
    }
    if let Some(budget) = budget {
        config.token_budget = budget;
    }
    Ok(config)
}

/// Token counter for this run: the Hugging Face tokenizer when one is
/// configured and compiled in, word counting otherwise.
#[cfg(feature = "hf-tokenizer")]
fn token_counter(config: &IngestConfig) -> Result<Box<dyn TokenCounter>> {
    match &config.tokenizer_path {
        Some(path) => Ok(Box::new(mdindex_chunker::HfTokenCounter::from_file(path)?)),
        None => Ok(Box::new(WordTokenCounter)),
    }
}

#[cfg(not(feature = "hf-tokenizer"))]
fn token_counter(config: &IngestConfig) -> Result<Box<dyn TokenCounter>> {
    if config.tokenizer_path.is_some() {
        tracing::warn!(
            "TOKENIZER_PATH is set but hf-tokenizer support is not compiled in, counting words"
        );
    }
    Ok(Box::new(WordTokenCounter))
}

fn pipeline(config: &IngestConfig) -> Result<ChunkPipeline<Box<dyn TokenCounter>>> {
    Ok(ChunkPipeline::new(
        &config.chunker_config(),
        token_counter(config)?,
    )?)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn store() -> Result<WeaviateClient> {
    let config = StoreConfig::from_env()?;
    tracing::debug!(?config, "Store configuration");
    WeaviateClient::new(&config)
}

fn print_chunk_failures(output: &BatchOutput) {
    for failure in &output.failures {
        eprintln!(
            "  {} {}: {}",
            style("Skipped").yellow().bold(),
            failure.document,
            failure.error
        );
    }
}

fn print_report(verb: &str, report: &BatchReport) {
    println!(
        "{} {} of {} objects",
        style(verb).green().bold(),
        report.succeeded.len(),
        report.attempted()
    );
    for failure in &report.failures {
        println!(
            "  {} {}: {}",
            style("Failed").red().bold(),
            failure.target,
            failure.error
        );
    }
}

/// Execute the chunk command.
fn chunk_command(
    documents: Option<PathBuf>,
    output: Option<PathBuf>,
    budget: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = ingest_config(documents, output, budget)?;
    let paths = discover_documents(&config.documents_dir)?;
    let pipeline = pipeline(&config)?;

    let pb = spinner("Chunking documents...");
    let output = pipeline.chunk_paths(&paths);
    pb.finish_and_clear();

    print_chunk_failures(&output);

    if json {
        write_json_lines(&output.records, io::stdout().lock())?;
        return Ok(());
    }

    let written = write_chunk_files(&output.records, &config.chunks_dir)?;
    println!(
        "{} {} chunks from {} documents to {}",
        style("Wrote").green().bold(),
        written.len(),
        output.documents,
        config.chunks_dir.display()
    );
    Ok(())
}

/// Execute the outline command.
fn outline_command(file: &Path, json: bool) -> Result<()> {
    let document = Document::load(file)?;
    let headers = Classifier::default().outline(document.lines());

    if json {
        let mut out = io::stdout().lock();
        for header in &headers {
            serde_json::to_writer(&mut out, header)?;
            writeln!(out)?;
        }
        return Ok(());
    }

    println!("{}", style(document.name()).bold());
    for header in headers {
        println!(
            "  {:>5}  {}",
            style(header.index + 1).dim(),
            header.text.trim()
        );
    }
    Ok(())
}

/// Execute the create-schema command.
fn create_schema_command() -> Result<()> {
    let store = store()?;
    let schema = chunks_class_schema(store.class_name());

    let pb = spinner("Creating class...");
    let stored = create_schema(&store, &schema);
    pb.finish_and_clear();
    let stored = stored?;

    println!("{} {}", style("Created class").green().bold(), style(&stored.class).cyan());
    println!("{}", serde_json::to_string_pretty(&stored)?);
    Ok(())
}

/// Execute the show-schema command.
fn show_schema_command() -> Result<()> {
    let store = store()?;
    let schema = store.get_class(store.class_name())?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Execute the ingest command.
fn ingest_command(documents: Option<PathBuf>, budget: Option<usize>) -> Result<()> {
    let config = ingest_config(documents, None, budget)?;
    let store = store()?;
    let paths = discover_documents(&config.documents_dir)?;
    let pipeline = pipeline(&config)?;

    println!(
        "{} {} documents into {}",
        style("Ingesting").bold(),
        paths.len(),
        style(store.class_name()).cyan()
    );

    let pb = spinner("Chunking and uploading...");
    let summary = ingest_paths(&pipeline, &store, &paths);
    pb.finish_and_clear();

    print_chunk_failures(&summary.chunked);
    print_report("Uploaded", &summary.uploaded);
    Ok(())
}

/// Execute the delete-all command.
fn delete_all_command() -> Result<()> {
    let store = store()?;
    let class = store.class_name().to_string();

    let pb = spinner("Deleting objects...");
    let report = delete_all(&store, &class);
    pb.finish_and_clear();

    print_report("Deleted", &report?);
    Ok(())
}
