//! Node definitions for the crawl tree
//!
//! A node is either an index, holding children in the order their links
//! appear on the page, or a leaf holding one extracted section.

use serde::Serialize;
use std::fmt;

/// How a fetched document was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    /// A navigational page whose links lead deeper into the hierarchy
    Index,

    /// A leaf table: a page that carries its sections' full content in place
    Terminal,
}

impl NodeKind {
    /// Returns the fixed-width label used in progress output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Index => "Table    ",
            Self::Terminal => "LeafTable",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().trim_end())
    }
}

/// One node of the crawl tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CrawlNode {
    Index(IndexNode),
    Leaf(LeafNode),
}

/// An index node and its children, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexNode {
    pub title: String,
    pub children: Vec<CrawlNode>,
}

/// A single extracted section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeafNode {
    pub title: String,

    /// Date the section became effective
    pub effective_date: String,

    /// Most recent legislative action on the section
    pub latest_action: String,

    /// Section text, one entry per paragraph
    pub body_paragraphs: Vec<String>,

    /// Notice shown under the section, empty if the page has none
    pub footer_notice: String,
}

impl CrawlNode {
    /// The node's title
    pub fn title(&self) -> &str {
        match self {
            Self::Index(index) => &index.title,
            Self::Leaf(leaf) => &leaf.title,
        }
    }

    /// The node's children; leaves have none
    pub fn children(&self) -> &[CrawlNode] {
        match self {
            Self::Index(index) => &index.children,
            Self::Leaf(_) => &[],
        }
    }

    pub fn as_index(&self) -> Option<&IndexNode> {
        match self {
            Self::Index(index) => Some(index),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Index(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Visits this node and all of its descendants in pre-order
    ///
    /// The callback receives each node together with its depth, the root
    /// being at depth 0.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&CrawlNode, usize),
    {
        self.walk_inner(0, &mut visit);
    }

    fn walk_inner<F>(&self, depth: usize, visit: &mut F)
    where
        F: FnMut(&CrawlNode, usize),
    {
        visit(self, depth);
        for child in self.children() {
            child.walk_inner(depth + 1, visit);
        }
    }
}

impl From<IndexNode> for CrawlNode {
    fn from(index: IndexNode) -> Self {
        Self::Index(index)
    }
}

impl From<LeafNode> for CrawlNode {
    fn from(leaf: LeafNode) -> Self {
        Self::Leaf(leaf)
    }
}
