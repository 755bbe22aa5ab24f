//! Crawl tree definitions
//!
//! This module defines the tree a crawl produces and read-only walkers over
//! it. The tree is handed to the renderer by value once the crawl completes.

mod node;
mod stats;

pub use node::{CrawlNode, IndexNode, LeafNode, NodeKind};
pub use stats::{print_statistics, TreeStatistics};
