//! Section content extraction
//!
//! Extraction is pure: it reads an already fetched fragment and never
//! touches the network.

use crate::crawler::parser::{
    element_text, first_text, BODY_PARAGRAPH, CONTENT_TITLE, INFO_VALUE, NOTICE,
};
use crate::tree::LeafNode;
use scraper::ElementRef;

/// Extracts one section from its fragment of a leaf table
///
/// The info module is expected to hold exactly two values, the effective
/// date followed by the latest legislative action. With a single value both
/// fields carry it, and with none both are empty.
pub fn extract(section: ElementRef<'_>) -> LeafNode {
    let title = first_text(section, &CONTENT_TITLE);

    let info: Vec<String> = section.select(&INFO_VALUE).map(element_text).collect();
    let effective_date = info.first().cloned().unwrap_or_default();
    let latest_action = info.last().cloned().unwrap_or_default();

    let body_paragraphs = section.select(&BODY_PARAGRAPH).map(element_text).collect();

    let footer_notice = first_text(section, &NOTICE);

    LeafNode {
        title,
        effective_date,
        latest_action,
        body_paragraphs,
        footer_notice,
    }
}
