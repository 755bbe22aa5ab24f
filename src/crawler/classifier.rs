//! Document classification
//!
//! A page offering an "expand all" control already holds the full text of
//! every section it lists, so it can be read in place instead of being
//! visited link by link. Everything else is an index.

use crate::crawler::parser::{ParsedDocument, EXPAND_ALL};
use crate::tree::NodeKind;

/// Classifies a fetched document as an index or a terminal leaf table
pub fn classify(doc: &ParsedDocument) -> NodeKind {
    if doc.contains(&EXPAND_ALL) {
        NodeKind::Terminal
    } else {
        NodeKind::Index
    }
}
