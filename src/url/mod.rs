//! URL handling module for Statute-Crawler
//!
//! This module provides the absolute locator type used for every fetch and
//! the resolution of relative references found in index pages.

mod target;

pub use target::RetrievalTarget;
