//! Vector store client.
//!
//! [`VectorStore`] is the seam between chunk ingestion and the store, so the
//! batch operations can be tested without a server. [`WeaviateClient`]
//! implements it against the Weaviate REST and GraphQL endpoints.

use std::fmt;

use mdindex_chunker::ChunkRecord;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{StoreConfig, QUERY_PAGE_SIZE};
use crate::error::{IndexerError, Result};
use crate::http::{create_client, send_with_retry, Idempotency, RetryPolicy};
use crate::schema::{ClassSchema, CHUNK_NUMBER_PROPERTY, CONTENT_PROPERTY, NAME_PROPERTY};

/// Operations the indexer needs from a vector store.
pub trait VectorStore: Send + Sync {
    /// Class that chunk objects are written to.
    fn class_name(&self) -> &str;

    /// Create a class.
    fn create_class(&self, schema: &ClassSchema) -> Result<()>;

    /// Fetch a class definition by name.
    fn get_class(&self, name: &str) -> Result<ClassSchema>;

    /// Store one chunk as an object of [`VectorStore::class_name`].
    ///
    /// # Returns
    /// The id the store assigned to the object
    fn post_object(&self, record: &ChunkRecord) -> Result<String>;

    /// Delete an object by id.
    fn delete_object(&self, id: &str) -> Result<()>;

    /// One page of object ids of `class`, starting after the id `after`.
    fn query_ids(&self, class: &str, limit: usize, after: Option<&str>) -> Result<Vec<String>>;

    /// All object ids of `class`, fetched page by page until an empty page.
    fn query_all_ids(&self, class: &str) -> Result<Vec<String>> {
        let mut ids: Vec<String> = Vec::new();
        loop {
            let after = ids.last().map(String::as_str);
            let page = self.query_ids(class, QUERY_PAGE_SIZE, after)?;
            if page.is_empty() {
                break;
            }
            if after.is_some() && page.last().map(String::as_str) == after {
                return Err(IndexerError::ResponseParse(format!(
                    "pagination of {class} did not advance past {}",
                    after.unwrap_or_default()
                )));
            }
            tracing::debug!(
                class,
                page = page.len(),
                total = ids.len() + page.len(),
                "Fetched id page"
            );
            ids.extend(page);
        }
        Ok(ids)
    }
}

/// JSON body of a chunk object.
#[must_use]
pub fn object_body(class: &str, record: &ChunkRecord) -> Value {
    json!({
        "class": class,
        "properties": {
            NAME_PROPERTY: record.document,
            CHUNK_NUMBER_PROPERTY: record.sequence,
            CONTENT_PROPERTY: record.content,
        }
    })
}

/// GraphQL query listing object ids of `class`.
///
/// # Examples
/// ```
/// use mdindex_indexer::store::ids_query;
///
/// assert_eq!(
///     ids_query("Chunks", 2, Some("abc")),
///     r#"{ Get { Chunks(limit: 2, after: "abc") { _additional { id } } } }"#
/// );
/// ```
#[must_use]
pub fn ids_query(class: &str, limit: usize, after: Option<&str>) -> String {
    let after = after
        .map(|id| format!(", after: {}", Value::String(id.to_string())))
        .unwrap_or_default();
    format!("{{ Get {{ {class}(limit: {limit}{after}) {{ _additional {{ id }} }} }} }}")
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

/// Extract `data.Get.<class>[]._additional.id` from a GraphQL response.
pub fn parse_ids(class: &str, body: &str) -> Result<Vec<String>> {
    let response: GraphQlResponse = serde_json::from_str(body)?;

    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(IndexerError::ResponseParse(format!(
            "GraphQL errors: {}",
            messages.join("; ")
        )));
    }

    let objects = response
        .data
        .as_ref()
        .and_then(|data| data.get("Get"))
        .and_then(|get| get.get(class))
        .and_then(Value::as_array)
        .ok_or_else(|| IndexerError::ResponseParse(format!("no {class} objects in response")))?;

    objects
        .iter()
        .map(|object| {
            object
                .pointer("/_additional/id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    IndexerError::ResponseParse("object without _additional.id".into())
                })
        })
        .collect()
}

#[derive(Deserialize)]
struct CreatedObject {
    id: String,
}

/// Blocking client for a Weaviate instance.
pub struct WeaviateClient {
    client: Client,
    api_url: String,
    class_name: String,
    retry: RetryPolicy,
}

impl WeaviateClient {
    /// Create a client for the store described by `config`, with the
    /// default retry policy.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            api_url: config.api_url.clone(),
            class_name: config.class_name.clone(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy, e.g. to shorten backoff.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    fn post_json(&self, path: &str, body: &Value, idempotency: Idempotency) -> Result<String> {
        let url = self.url(path);
        let payload = serde_json::to_vec(body)?;
        let response = send_with_retry(&self.retry, idempotency, || {
            self.client
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(payload.clone())
        })?;
        Ok(response.text()?)
    }
}

impl fmt::Debug for WeaviateClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeaviateClient")
            .field("api_url", &self.api_url)
            .field("class_name", &self.class_name)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl VectorStore for WeaviateClient {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn create_class(&self, schema: &ClassSchema) -> Result<()> {
        let body = serde_json::to_value(schema)?;
        self.post_json("schema", &body, Idempotency::NonIdempotent)?;
        tracing::info!(class = %schema.class, "Created class");
        Ok(())
    }

    fn get_class(&self, name: &str) -> Result<ClassSchema> {
        let url = self.url(&format!("schema/{name}"));
        let response = send_with_retry(&self.retry, Idempotency::Idempotent, || {
            self.client.get(&url)
        })?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn post_object(&self, record: &ChunkRecord) -> Result<String> {
        let object = object_body(&self.class_name, record);
        let body = self.post_json("objects", &object, Idempotency::NonIdempotent)?;
        let created: CreatedObject = serde_json::from_str(&body)?;
        tracing::debug!(
            id = %created.id,
            document = %record.document,
            chunk_number = record.sequence,
            "Stored chunk"
        );
        Ok(created.id)
    }

    fn delete_object(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("objects/{id}"));
        let response = send_with_retry(&self.retry, Idempotency::Idempotent, || {
            self.client.delete(&url)
        })?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(IndexerError::Store {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        tracing::debug!(id, "Deleted object");
        Ok(())
    }

    fn query_ids(&self, class: &str, limit: usize, after: Option<&str>) -> Result<Vec<String>> {
        let query = ids_query(class, limit, after);
        let body = self.post_json("graphql", &json!({ "query": query }), Idempotency::Idempotent)?;
        parse_ids(class, &body)
    }
}
