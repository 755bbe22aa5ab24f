//! Statute-Crawler: a hierarchy crawler for legal-code websites
//!
//! This crate walks a legal-code site from its table of contents down to the
//! individual sections, classifying every page it visits as an index or a
//! leaf table, extracting section content, and assembling the result into an
//! in-memory tree that mirrors the site's navigation.

pub mod config;
pub mod crawler;
pub mod tree;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Transient failure for {url}: {message}")]
    Transient { url: String, message: String },

    #[error("Permanent failure for {url}: HTTP {status}")]
    Permanent { url: String, status: u16 },

    #[error("Rate limited by {url}, retries exhausted")]
    RateLimited { url: String },

    #[error("Unparseable document at {url}: {message}")]
    Unparseable { url: String, message: String },

    #[error("Cannot fetch {url}: {message}")]
    Unfetchable { url: String, message: String },

    #[error("Malformed reference '{href}' in {base}: {source}")]
    MalformedReference {
        base: String,
        href: String,
        source: ::url::ParseError,
    },

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CrawlError {
    /// Returns true if a failure of this kind on a child target should drop
    /// the child instead of aborting its ancestors
    ///
    /// Only fetch-level failures qualify. A malformed reference means the
    /// site no longer has the shape the crawler depends on, and cancellation
    /// has to reach the caller.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::Transient { .. }
                | Self::Permanent { .. }
                | Self::RateLimited { .. }
                | Self::Unparseable { .. }
                | Self::Unfetchable { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlObserver, Crawler, LogObserver};
pub use tree::{CrawlNode, IndexNode, LeafNode, NodeKind};
pub use url::RetrievalTarget;
