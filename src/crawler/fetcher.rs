//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests with retry under an exponential backoff
//! - Honoring `Retry-After` on rate-limited responses
//! - Error classification

use crate::config::{Config, RetryConfig};
use crate::crawler::backoff::ExponentialBackoff;
use crate::crawler::parser::ParsedDocument;
use crate::url::RetrievalTarget;
use crate::CrawlError;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Builds an HTTP client with proper configuration
///
/// The client is built once per crawl and shared by every fetch, so
/// connections to the source site are reused.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Why a single attempt failed
#[derive(Debug)]
enum AttemptError {
    /// Transport error or unexpected status; worth retrying
    Transient(String),

    /// Client error other than 429; retrying cannot help
    Permanent(u16),

    /// HTTP 429, with the server-requested wait if it sent a usable one
    RateLimited(Option<Duration>),

    /// The body arrived but cannot be read as an HTML document
    Unparseable(String),

    /// The client refused to build the request; retrying cannot help
    Rejected(String),
}

/// Fetches documents with retry, backoff and rate-limit handling
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 429 with `Retry-After: N` | Wait N seconds, reset backoff, retry |
/// | HTTP 429 without usable header | Retry with backoff |
/// | Other HTTP 4xx | Fail immediately → Permanent |
/// | HTTP 5xx, other statuses | Retry with backoff |
/// | Transport error, timeout | Retry with backoff |
/// | Non-HTML or non-UTF-8 body | Fail immediately → Unparseable |
/// | Request cannot be built | Fail immediately → Unfetchable |
///
/// Once the backoff's elapsed-time budget is spent the fetch fails with
/// `Transient`, or `RateLimited` if the last response was a 429.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryConfig,
    cancel: CancellationToken,
}

impl Fetcher {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `retry` - The backoff schedule for transient failures
    /// * `cancel` - Token that aborts in-flight requests and backoff waits
    pub fn new(client: Client, retry: RetryConfig, cancel: CancellationToken) -> Self {
        Self {
            client,
            retry,
            cancel,
        }
    }

    /// The token that aborts this fetcher's requests and backoff waits
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fetches and parses one document
    ///
    /// # Errors
    ///
    /// * `CrawlError::Permanent` - The server rejected the request with a 4xx
    /// * `CrawlError::Transient` - Retries exhausted on transport or server errors
    /// * `CrawlError::RateLimited` - Retries exhausted while rate limited
    /// * `CrawlError::Unparseable` - The body is not an HTML document
    /// * `CrawlError::Unfetchable` - The client cannot send a request for the target
    /// * `CrawlError::Cancelled` - The crawl was cancelled
    pub async fn fetch(&self, target: &RetrievalTarget) -> Result<ParsedDocument, CrawlError> {
        let mut backoff = ExponentialBackoff::new(&self.retry);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            tracing::debug!("Fetching {} (attempt {})", target, attempt);

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(CrawlError::Cancelled),
                outcome = fetch_body(&self.client, target) => outcome,
            };

            let failure = match outcome {
                Ok(body) => return Ok(ParsedDocument::parse(&body)),
                Err(failure) => failure,
            };

            let delay = match &failure {
                AttemptError::Permanent(status) => {
                    return Err(CrawlError::Permanent {
                        url: target.to_string(),
                        status: *status,
                    });
                }
                AttemptError::Unparseable(message) => {
                    return Err(CrawlError::Unparseable {
                        url: target.to_string(),
                        message: message.clone(),
                    });
                }
                AttemptError::Rejected(message) => {
                    return Err(CrawlError::Unfetchable {
                        url: target.to_string(),
                        message: message.clone(),
                    });
                }
                AttemptError::RateLimited(Some(wait)) => {
                    tracing::info!("Rate limited by {}, server asked for {:?}", target, wait);
                    backoff.rate_limited(*wait)
                }
                AttemptError::RateLimited(None) | AttemptError::Transient(_) => {
                    backoff.next_delay()
                }
            };

            let Some(delay) = delay else {
                tracing::warn!(
                    "Giving up on {} after {} attempts in {:?}",
                    target,
                    attempt,
                    backoff.elapsed()
                );
                return Err(exhausted(target, failure, attempt));
            };

            tracing::warn!(
                "Attempt {} for {} failed ({:?}), retrying in {:?}",
                attempt,
                target,
                failure,
                delay
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(CrawlError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

/// Maps the last failure of an exhausted retry loop to its crawl error
fn exhausted(target: &RetrievalTarget, failure: AttemptError, attempts: u32) -> CrawlError {
    match failure {
        AttemptError::RateLimited(_) => CrawlError::RateLimited {
            url: target.to_string(),
        },
        AttemptError::Transient(message) => CrawlError::Transient {
            url: target.to_string(),
            message: format!("{} (gave up after {} attempts)", message, attempts),
        },
        AttemptError::Permanent(status) => CrawlError::Permanent {
            url: target.to_string(),
            status,
        },
        AttemptError::Unparseable(message) => CrawlError::Unparseable {
            url: target.to_string(),
            message,
        },
        AttemptError::Rejected(message) => CrawlError::Unfetchable {
            url: target.to_string(),
            message,
        },
    }
}

/// Performs a single GET and returns the body text
async fn fetch_body(client: &Client, target: &RetrievalTarget) -> Result<String, AttemptError> {
    let response = client
        .get(target.as_url().clone())
        .send()
        .await
        .map_err(send_error)?;

    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AttemptError::RateLimited(parse_retry_after(
            response.headers(),
        )));
    }

    if status.is_client_error() {
        return Err(AttemptError::Permanent(status.as_u16()));
    }

    if !status.is_success() {
        return Err(AttemptError::Transient(format!("HTTP {}", status.as_u16())));
    }

    if let Some(content_type) = content_type(response.headers()) {
        if !content_type.contains("html") {
            return Err(AttemptError::Unparseable(format!(
                "expected HTML, got {}",
                content_type
            )));
        }
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AttemptError::Transient(describe(&e)))?;

    String::from_utf8(bytes.to_vec())
        .map_err(|e| AttemptError::Unparseable(format!("body is not UTF-8: {}", e)))
}

/// Reads a `Retry-After` header expressed in whole seconds
///
/// Returns `None` if the header is missing or not a plain number of seconds.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
}

/// Maps a failed send to an attempt error
///
/// Builder errors (unsupported scheme, invalid URL) fail the same way on
/// every attempt, so they are not retried.
fn send_error(error: reqwest::Error) -> AttemptError {
    if error.is_builder() {
        AttemptError::Rejected(error.to_string())
    } else {
        AttemptError::Transient(describe(&error))
    }
}

/// Classifies a transport error for logging
fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}
