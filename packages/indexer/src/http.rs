//! HTTP client construction and retrying request execution.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::config::StoreConfig;
use crate::error::{IndexerError, Result};

/// User agent string identifying this indexer.
const USER_AGENT: &str = concat!("mdindex/", env!("CARGO_PKG_VERSION"));

/// Maximum number of attempts for transient failures.
pub const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// How often and how patiently transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts in total, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for every retry after it.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay before `attempt` (zero-based): nothing, then base, 2x base, 4x base...
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay * (1 << (attempt - 1))
    }
}

/// Whether sending a request twice has the same effect as sending it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    /// Reads, queries and deletes.
    Idempotent,
    /// Object creation. A request that timed out may already have been
    /// applied, so it is never resent after a timeout.
    NonIdempotent,
}

/// Outcome of the last failed attempt.
enum LastFailure {
    Transport(String),
    Server { status: u16, body: String },
}

/// Create an HTTP client that sends the bearer token with every request.
pub fn create_client(config: &StoreConfig) -> Result<Client> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token)).map_err(|_| {
        IndexerError::Config("WEAVIATE_API_TOKEN contains invalid characters".into())
    })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Send a request, retrying connect errors, timeouts and 5xx responses.
///
/// `build` is called once per attempt since a blocking request cannot be
/// reused after sending. Timeouts are only retried for
/// [`Idempotency::Idempotent`] requests; a connect error means nothing
/// reached the server and is always retried.
///
/// # Errors
/// * [`IndexerError::Store`] for a 4xx response (not retried), or for a 5xx
///   response that persisted through every attempt, with the last body
/// * [`IndexerError::RetriesExhausted`] when every attempt failed in transport
/// * [`IndexerError::Http`] for errors that are not worth retrying
pub fn send_with_retry<F>(
    policy: &RetryPolicy,
    idempotency: Idempotency,
    build: F,
) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_failure: Option<LastFailure> = None;

    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            let delay = policy.delay_before(attempt);
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Retrying after delay"
            );
            thread::sleep(delay);
        }

        match build().send() {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() {
                    let body = response.text().unwrap_or_default();
                    tracing::warn!(
                        status = %status,
                        body = %body,
                        attempt = attempt + 1,
                        max_retries = policy.max_attempts,
                        "Server error, will retry"
                    );
                    last_failure = Some(LastFailure::Server {
                        status: status.as_u16(),
                        body,
                    });
                    continue;
                }

                if !status.is_success() {
                    let body = response.text().unwrap_or_default();
                    return Err(IndexerError::Store {
                        status: status.as_u16(),
                        body,
                    });
                }

                return Ok(response);
            }
            Err(e) => {
                let retryable = e.is_connect()
                    || (e.is_timeout() && idempotency == Idempotency::Idempotent);
                if retryable {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = policy.max_attempts,
                        "Connection error, will retry"
                    );
                    last_failure = Some(LastFailure::Transport(e.to_string()));
                    continue;
                }
                if e.is_timeout() {
                    tracing::warn!(error = %e, "Write timed out, not resending");
                }
                return Err(IndexerError::Http(e));
            }
        }
    }

    Err(match last_failure {
        Some(LastFailure::Server { status, body }) => IndexerError::Store { status, body },
        Some(LastFailure::Transport(message)) => IndexerError::RetriesExhausted {
            attempts: policy.max_attempts,
            message,
        },
        None => IndexerError::RetriesExhausted {
            attempts: policy.max_attempts,
            message: "Unknown error".to_string(),
        },
    })
}
