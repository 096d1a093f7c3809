//! Batch operations against a [`VectorStore`]: schema setup, chunk upload and
//! bulk deletion.
//!
//! Batches never stop at the first failed object; every outcome is recorded
//! in a [`BatchReport`].

use std::path::PathBuf;

use mdindex_chunker::{BatchOutput, ChunkPipeline, ChunkRecord, TokenCounter};

use crate::error::{IndexerError, Result};
use crate::schema::ClassSchema;
use crate::store::VectorStore;

/// An object the store rejected.
#[derive(Debug)]
pub struct ObjectFailure {
    /// Chunk file name for uploads, object id for deletions.
    pub target: String,
    /// Why the store rejected it.
    pub error: IndexerError,
}

/// Per-object outcome of a store batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Ids of objects the batch handled successfully.
    pub succeeded: Vec<String>,
    /// Objects the batch could not handle, in batch order.
    pub failures: Vec<ObjectFailure>,
}

impl BatchReport {
    /// Number of objects the batch tried.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, target: String, outcome: Result<String>) {
        match outcome {
            Ok(id) => self.succeeded.push(id),
            Err(error) => {
                tracing::warn!(target = %target, error = %error, "Store operation failed");
                self.failures.push(ObjectFailure { target, error });
            }
        }
    }
}

/// Result of chunking a set of documents and uploading the chunks.
#[derive(Debug)]
pub struct IngestSummary {
    /// Chunk records and per-document failures.
    pub chunked: BatchOutput,
    /// Per-object outcome of uploading [`BatchOutput::records`].
    pub uploaded: BatchReport,
}

/// Create `schema`, then read it back from the store.
pub fn create_schema<S: VectorStore + ?Sized>(
    store: &S,
    schema: &ClassSchema,
) -> Result<ClassSchema> {
    store.create_class(schema)?;
    let stored = store.get_class(&schema.class)?;
    if stored.class != schema.class {
        return Err(IndexerError::ResponseParse(format!(
            "requested class {} but store returned {}",
            schema.class, stored.class
        )));
    }
    Ok(stored)
}

/// Upload chunk records one object at a time, in order.
pub fn upload_records<S: VectorStore + ?Sized>(store: &S, records: &[ChunkRecord]) -> BatchReport {
    let mut report = BatchReport::default();
    for record in records {
        report.record(record.file_name(), store.post_object(record));
    }
    tracing::info!(
        class = store.class_name(),
        uploaded = report.succeeded.len(),
        failed = report.failures.len(),
        "Uploaded chunks"
    );
    report
}

/// Delete every object of `class`.
///
/// Listing the ids must succeed; individual deletions may fail without
/// stopping the rest.
pub fn delete_all<S: VectorStore + ?Sized>(store: &S, class: &str) -> Result<BatchReport> {
    let ids = store.query_all_ids(class)?;
    tracing::info!(class, objects = ids.len(), "Deleting objects");

    let mut report = BatchReport::default();
    for id in ids {
        let outcome = store.delete_object(&id).map(|()| id.clone());
        report.record(id, outcome);
    }
    Ok(report)
}

/// Chunk documents from disk and upload every resulting record.
///
/// Documents that fail to chunk are reported in
/// [`IngestSummary::chunked`] and contribute nothing to the upload.
pub fn ingest_paths<T, S>(
    pipeline: &ChunkPipeline<T>,
    store: &S,
    paths: &[PathBuf],
) -> IngestSummary
where
    T: TokenCounter,
    S: VectorStore + ?Sized,
{
    let chunked = pipeline.chunk_paths(paths);
    let uploaded = upload_records(store, &chunked.records);
    IngestSummary { chunked, uploaded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::chunks_class_schema;
    use mdindex_chunker::{ChunkerConfig, Document, WordTokenCounter};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// In-memory store that rejects chosen chunk contents and ids.
    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<Vec<(String, String)>>,
        classes: Mutex<Vec<ClassSchema>>,
        reject_content: Option<&'static str>,
        reject_id: Option<&'static str>,
    }

    impl VectorStore for MemoryStore {
        fn class_name(&self) -> &str {
            "Chunks"
        }

        fn create_class(&self, schema: &ClassSchema) -> Result<()> {
            self.classes.lock().unwrap().push(schema.clone());
            Ok(())
        }

        fn get_class(&self, name: &str) -> Result<ClassSchema> {
            self.classes
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.class == name)
                .cloned()
                .ok_or(IndexerError::Store {
                    status: 404,
                    body: String::new(),
                })
        }

        fn post_object(&self, record: &ChunkRecord) -> Result<String> {
            if self.reject_content.is_some_and(|c| record.content.contains(c)) {
                return Err(IndexerError::Store {
                    status: 422,
                    body: "rejected".to_string(),
                });
            }
            let mut objects = self.objects.lock().unwrap();
            let id = format!("obj-{}", objects.len());
            objects.push((id.clone(), record.content.clone()));
            Ok(id)
        }

        fn delete_object(&self, id: &str) -> Result<()> {
            if self.reject_id == Some(id) {
                return Err(IndexerError::Store {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            self.objects.lock().unwrap().retain(|(oid, _)| oid != id);
            Ok(())
        }

        fn query_ids(
            &self,
            _class: &str,
            limit: usize,
            after: Option<&str>,
        ) -> Result<Vec<String>> {
            let objects = self.objects.lock().unwrap();
            let start = after
                .and_then(|a| objects.iter().position(|(id, _)| id == a))
                .map_or(0, |p| p + 1);
            Ok(objects
                .iter()
                .skip(start)
                .take(limit)
                .map(|(id, _)| id.clone())
                .collect())
        }
    }

    fn records(doc: &str) -> Vec<ChunkRecord> {
        let pipeline =
            ChunkPipeline::new(&ChunkerConfig::new(300).with_workers(1), WordTokenCounter).unwrap();
        pipeline
            .chunk_document(&Document::from_text("doc.md", doc))
            .unwrap()
    }

    #[test]
    fn test_create_schema_verifies() {
        let store = MemoryStore::default();
        let stored = create_schema(&store, &chunks_class_schema("Chunks")).unwrap();
        assert_eq!(stored, chunks_class_schema("Chunks"));
    }

    #[test]
    fn test_upload_continues_after_failure() {
        let store = MemoryStore {
            reject_content: Some("bad"),
            ..MemoryStore::default()
        };
        let records = records("# A\nok\n# B\nbad\n# C\nok too");

        let report = upload_records(&store, &records);

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].target, "doc.md_chunk_2_1.md");
        assert!(!report.is_complete());
    }

    #[test]
    fn test_delete_all_reports_each_object() {
        let store = MemoryStore {
            reject_id: Some("obj-1"),
            ..MemoryStore::default()
        };
        upload_records(&store, &records("# A\none\n# B\ntwo\n# C\nthree"));

        let report = delete_all(&store, "Chunks").unwrap();

        assert_eq!(report.succeeded, vec!["obj-0", "obj-2"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].target, "obj-1");
        assert_eq!(store.objects.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_all_on_empty_class() {
        let report = delete_all(&MemoryStore::default(), "Chunks").unwrap();
        assert_eq!(report.attempted(), 0);
        assert!(report.is_complete());
    }

    #[test]
    fn test_ingest_paths_uploads_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\nfirst\n## More\nsecond").unwrap();
        let missing = dir.path().join("missing.md");

        let pipeline =
            ChunkPipeline::new(&ChunkerConfig::new(300).with_workers(2), WordTokenCounter).unwrap();
        let store = MemoryStore::default();

        let summary = ingest_paths(&pipeline, &store, &[path, missing]);

        assert_eq!(summary.chunked.documents, 1);
        assert_eq!(summary.chunked.failures.len(), 1);
        assert_eq!(summary.uploaded.succeeded.len(), 2);
        assert_eq!(
            store.objects.lock().unwrap()[0].1,
            "# Notes\nfirst".to_string()
        );
    }
}
