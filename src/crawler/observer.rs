//! Progress reporting for a running crawl
//!
//! The crawler reports every page it classifies and every child it drops
//! through a [`CrawlObserver`]. Where the reports go is up to the caller.

use crate::tree::NodeKind;
use crate::url::RetrievalTarget;
use crate::CrawlError;

/// Receives progress events from a crawl
///
/// Observers may be called from several sibling crawls at once, so they must
/// be `Send + Sync`.
pub trait CrawlObserver: Send + Sync {
    /// Called once per fetched page, as soon as it has been classified
    fn node_visited(&self, kind: NodeKind, target: &RetrievalTarget);

    /// Called when a child page is left out of its parent after a fetch failure
    fn child_skipped(&self, _target: &RetrievalTarget, _error: &CrawlError) {}
}

/// Observer that reports progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl CrawlObserver for LogObserver {
    fn node_visited(&self, kind: NodeKind, target: &RetrievalTarget) {
        tracing::info!("{} {}", kind.label(), target.path());
    }

    fn child_skipped(&self, target: &RetrievalTarget, error: &CrawlError) {
        tracing::warn!("Skipping {}: {}", target, error);
    }
}

/// Observer that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CrawlObserver for NoopObserver {
    fn node_visited(&self, _kind: NodeKind, _target: &RetrievalTarget) {}
}
