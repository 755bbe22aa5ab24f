//! Crawler coordinator - tree construction
//!
//! This module walks the site depth-first. Each page is fetched, classified,
//! and then either expanded into its children (index pages) or read in place
//! (leaf tables). A parent node is only assembled once every child has
//! resolved, so callers never see a partially built subtree.

use crate::config::Config;
use crate::crawler::classifier::classify;
use crate::crawler::extractor::extract;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::observer::{CrawlObserver, LogObserver};
use crate::crawler::parser::{ParsedDocument, CHILD_LINK, HEADING, NAME_CELL};
use crate::tree::{CrawlNode, IndexNode, NodeKind};
use crate::url::RetrievalTarget;
use crate::CrawlError;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// What a classified page turned into before any child is fetched
#[derive(Debug)]
enum Page {
    /// An index page and the resolved targets of its child links
    Index {
        title: String,
        links: Vec<RetrievalTarget>,
    },

    /// A leaf table, fully read from the page itself
    LeafTable(IndexNode),
}

/// Builds the crawl tree for a site
///
/// The crawler owns the fetcher and the observer for one crawl. Sibling
/// pages may be fetched concurrently, but children are always assembled in
/// the order their links appear.
///
/// `max_concurrent_children` bounds the requests in flight across the whole
/// crawl, not per parent: every fetch takes a permit from one shared
/// semaphore. The permit is held only for the fetch itself, never while a
/// parent waits on its children.
pub struct Crawler {
    fetcher: Fetcher,
    observer: Arc<dyn CrawlObserver>,
    max_concurrent_children: usize,
    fetch_permits: Arc<Semaphore>,
}

impl Crawler {
    /// Creates a sequential crawler reporting progress through `tracing`
    ///
    /// The crawl stops when the fetcher's cancellation token fires.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The fetcher used for every page
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            observer: Arc::new(LogObserver),
            max_concurrent_children: 1,
            fetch_permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Creates a crawler from configuration
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Client` if the HTTP client cannot be built.
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self, CrawlError> {
        let client = build_http_client(config)?;
        let fetcher = Fetcher::new(client, config.retry.clone(), cancel);

        Ok(Self::new(fetcher)
            .with_max_concurrent_children(config.crawler.max_concurrent_children as usize))
    }

    /// Replaces the progress observer
    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Sets how many pages may be fetched at once (at least 1)
    pub fn with_max_concurrent_children(mut self, limit: usize) -> Self {
        let limit = limit.clamp(1, Semaphore::MAX_PERMITS);
        self.max_concurrent_children = limit;
        self.fetch_permits = Arc::new(Semaphore::new(limit));
        self
    }

    /// The token that stops this crawl
    pub fn cancel_token(&self) -> &CancellationToken {
        self.fetcher.cancel_token()
    }

    /// Crawls the hierarchy rooted at `root`
    ///
    /// Children that fail to fetch are left out of their parent and reported
    /// to the observer. Failure to fetch the root itself, a malformed child
    /// reference anywhere in the tree, or cancellation fail the whole crawl.
    ///
    /// The site is assumed to be a strict tree: a page reachable through two
    /// links is fetched twice, and a cycle would never terminate.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use statute_crawler::config::load_config;
    /// use statute_crawler::{Crawler, RetrievalTarget};
    /// use std::path::Path;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config(Path::new("config.toml"))?;
    /// let crawler = Crawler::from_config(&config, CancellationToken::new())?;
    /// let root = RetrievalTarget::parse(&config.crawler.start_url)?;
    /// let tree = crawler.crawl(&root).await?;
    /// println!("{} has {} children", tree.title(), tree.children().len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, root: &RetrievalTarget) -> Result<CrawlNode, CrawlError> {
        self.crawl_target(root.clone()).await
    }

    fn crawl_target(&self, target: RetrievalTarget) -> BoxFuture<'_, Result<CrawlNode, CrawlError>> {
        async move {
            if self.cancel_token().is_cancelled() {
                return Err(CrawlError::Cancelled);
            }

            let page = {
                let doc = self.fetch(&target).await?;
                let kind = classify(&doc);
                self.observer.node_visited(kind, &target);
                read_page(kind, &target, &doc)?
            };

            match page {
                Page::Index { title, links } => {
                    tracing::debug!("{} lists {} children", target, links.len());
                    let children = self.crawl_children(links).await?;
                    Ok(CrawlNode::Index(IndexNode { title, children }))
                }
                Page::LeafTable(table) => {
                    tracing::debug!("{} holds {} sections", target, table.children.len());
                    Ok(CrawlNode::Index(table))
                }
            }
        }
        .boxed()
    }

    /// Fetches one page while holding a crawl-wide permit
    async fn fetch(&self, target: &RetrievalTarget) -> Result<ParsedDocument, CrawlError> {
        // The semaphore is never closed; a failed acquire can only mean shutdown
        let _permit = self
            .fetch_permits
            .acquire()
            .await
            .map_err(|_| CrawlError::Cancelled)?;

        self.fetcher.fetch(target).await
    }

    /// Crawls child targets, keeping document order regardless of completion order
    async fn crawl_children(
        &self,
        links: Vec<RetrievalTarget>,
    ) -> Result<Vec<CrawlNode>, CrawlError> {
        let mut results = stream::iter(links)
            .map(|target| async move {
                let result = self.crawl_target(target.clone()).await;
                (target, result)
            })
            .buffered(self.max_concurrent_children);

        let mut children = Vec::new();
        while let Some((target, result)) = results.next().await {
            match result {
                Ok(node) => children.push(node),
                Err(e) if e.is_skippable() => self.observer.child_skipped(&target, &e),
                Err(e) => return Err(e),
            }
        }

        Ok(children)
    }
}

/// Reads a classified page without touching the network
///
/// Links that parse but cannot be fetched (`mailto:`, `javascript:`) are
/// dropped with a warning; links that do not parse fail the page.
fn read_page(
    kind: NodeKind,
    target: &RetrievalTarget,
    doc: &ParsedDocument,
) -> Result<Page, CrawlError> {
    let title = doc.first_text(&HEADING);

    match kind {
        NodeKind::Index => {
            let links = doc
                .root()
                .select(&CHILD_LINK)
                .map(|anchor| target.resolve(anchor.value().attr("href").unwrap_or_default()))
                .filter(|resolved| match resolved {
                    Err(e @ CrawlError::Unfetchable { .. }) => {
                        tracing::warn!("Ignoring link in {}: {}", target, e);
                        false
                    }
                    _ => true,
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Page::Index { title, links })
        }
        NodeKind::Terminal => {
            let children = doc
                .root()
                .select(&NAME_CELL)
                .map(|cell| CrawlNode::Leaf(extract(cell)))
                .collect();

            Ok(Page::LeafTable(IndexNode { title, children }))
        }
    }
}
