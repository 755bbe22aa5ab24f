//! Crawler module for building the statute tree
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry, backoff and rate-limit handling
//! - Classification of pages into indexes and leaf tables
//! - Extraction of section content
//! - Depth-first tree construction and progress reporting

mod backoff;
mod classifier;
mod coordinator;
mod extractor;
mod fetcher;
mod observer;
mod parser;

pub use backoff::ExponentialBackoff;
pub use classifier::classify;
pub use coordinator::Crawler;
pub use extractor::extract;
pub use fetcher::{build_http_client, parse_retry_after, Fetcher};
pub use observer::{CrawlObserver, LogObserver, NoopObserver};
pub use parser::ParsedDocument;

use crate::config::Config;
use crate::tree::CrawlNode;
use crate::url::RetrievalTarget;
use crate::CrawlError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl from the configured start URL
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client and fetcher
/// 2. Fetch and classify the start page
/// 3. Recurse through index pages and read leaf tables in place
/// 4. Return the assembled tree
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Token that aborts the crawl; a cancelled crawl returns no tree
///
/// # Returns
///
/// * `Ok(CrawlNode)` - The complete tree
/// * `Err(CrawlError)` - The root could not be crawled, a reference was
///   malformed, or the crawl was cancelled
pub async fn crawl(config: &Config, cancel: CancellationToken) -> Result<CrawlNode, CrawlError> {
    let root = RetrievalTarget::parse(&config.crawler.start_url)?;
    let crawler = Crawler::from_config(config, cancel)?;

    tracing::info!("Starting crawl at {}", root);
    let tree = crawler.crawl(&root).await?;
    tracing::info!("Crawl of {} complete", root);

    Ok(tree)
}
