use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Statute-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Absolute URL of the table of contents to start from
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Maximum number of sibling pages fetched at once (1 crawls sequentially)
    #[serde(rename = "max-concurrent-children", default = "default_concurrency")]
    pub max_concurrent_children: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Exponential backoff configuration for retrying transient failures
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetryConfig {
    /// Delay before the first retry (milliseconds)
    #[serde(rename = "initial-interval-ms")]
    pub initial_interval_ms: u64,

    /// Upper bound on a single delay (milliseconds)
    #[serde(rename = "max-interval-ms")]
    pub max_interval_ms: u64,

    /// Growth factor applied to the delay after each retry
    pub multiplier: f64,

    /// Total time after which a target is given up on (milliseconds)
    #[serde(rename = "max-elapsed-ms")]
    pub max_elapsed_ms: u64,
}

impl RetryConfig {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn max_elapsed(&self) -> Duration {
        Duration::from_millis(self.max_elapsed_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            max_interval_ms: 60_000,
            multiplier: 1.5,
            max_elapsed_ms: 15 * 60 * 1000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

fn default_concurrency() -> u32 {
    4
}

fn default_request_timeout() -> u64 {
    30
}
