//! Statistics over a completed crawl tree
//!
//! This module summarizes the tree a crawl produced, for display once the
//! crawl completes.

use crate::tree::CrawlNode;

/// Crawl tree statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStatistics {
    /// Number of index nodes, the root included
    pub index_nodes: u64,

    /// Number of leaf nodes
    pub leaf_nodes: u64,

    /// Index nodes that ended up without children
    pub empty_indexes: u64,

    /// Depth of the deepest node (the root is at depth 0)
    pub max_depth: usize,

    /// Total number of body paragraphs across all leaves
    pub paragraphs: u64,

    /// Leaves with no effective date
    pub leaves_missing_dates: u64,
}

impl TreeStatistics {
    /// Computes statistics for the tree rooted at `root`
    pub fn from_tree(root: &CrawlNode) -> Self {
        let mut stats = Self::default();

        root.walk(|node, depth| {
            stats.max_depth = stats.max_depth.max(depth);
            match node {
                CrawlNode::Index(index) => {
                    stats.index_nodes += 1;
                    if index.children.is_empty() {
                        stats.empty_indexes += 1;
                    }
                }
                CrawlNode::Leaf(leaf) => {
                    stats.leaf_nodes += 1;
                    stats.paragraphs += leaf.body_paragraphs.len() as u64;
                    if leaf.effective_date.is_empty() {
                        stats.leaves_missing_dates += 1;
                    }
                }
            }
        });

        stats
    }

    /// Total number of nodes in the tree
    pub fn total_nodes(&self) -> u64 {
        self.index_nodes + self.leaf_nodes
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `title` - Title of the crawled root
/// * `stats` - The statistics to display
pub fn print_statistics(title: &str, stats: &TreeStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Root: {}", title);
    println!();

    println!("Overview:");
    println!("  Total nodes: {}", stats.total_nodes());
    println!("  Index nodes: {}", stats.index_nodes);
    println!("  Sections: {}", stats.leaf_nodes);
    println!("  Maximum depth: {}", stats.max_depth);
    println!("  Body paragraphs: {}", stats.paragraphs);
    println!();

    if stats.empty_indexes > 0 || stats.leaves_missing_dates > 0 {
        println!("Warnings:");
        if stats.empty_indexes > 0 {
            println!("  Index nodes without children: {}", stats.empty_indexes);
        }
        if stats.leaves_missing_dates > 0 {
            println!(
                "  Sections without an effective date: {}",
                stats.leaves_missing_dates
            );
        }
        println!();
    }
}
