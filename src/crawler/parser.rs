//! HTML parsing and the markup contract with the source site
//!
//! Every CSS selector the crawler depends on lives here. The source site's
//! markup is an external contract: when it changes, this is the file to
//! update.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

macro_rules! selector {
    ($css:expr) => {
        LazyLock::new(|| Selector::parse($css).expect("static selector is valid"))
    };
}

/// Control that expands every section of a leaf table in place
pub(crate) static EXPAND_ALL: LazyLock<Selector> = selector!("#expand-all-button");

/// Page heading, used as the title of index nodes
pub(crate) static HEADING: LazyLock<Selector> = selector!("h1");

/// Links to the next level of the hierarchy
///
/// Citation links open in a new tab or carry a class; both point sideways
/// rather than deeper and are excluded.
pub(crate) static CHILD_LINK: LazyLock<Selector> =
    selector!(r#"td.name-cell a:not([target="_blank"]):not([class])"#);

/// One section of a leaf table
pub(crate) static NAME_CELL: LazyLock<Selector> = selector!("td.name-cell");

/// Section title link
pub(crate) static CONTENT_TITLE: LazyLock<Selector> = selector!(".content-head-text a");

/// Effective date and latest action, in that order
pub(crate) static INFO_VALUE: LazyLock<Selector> =
    selector!(".laws-section-info-module:not(.no-print) .value");

/// Section body paragraphs
pub(crate) static BODY_PARAGRAPH: LazyLock<Selector> = selector!(".laws-body span p");

/// Notice printed under a section
pub(crate) static NOTICE: LazyLock<Selector> = selector!(".laws-notice p");

/// A fetched document, parsed and ready to be queried
#[derive(Debug)]
pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    /// Parses an HTML document
    ///
    /// HTML parsing is forgiving; malformed markup still produces a tree.
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// The document's root element
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Returns true if any element matches `selector`
    pub fn contains(&self, selector: &Selector) -> bool {
        self.html.select(selector).next().is_some()
    }

    /// Text of the first element matching `selector`, or an empty string
    pub fn first_text(&self, selector: &Selector) -> String {
        first_text(self.root(), selector)
    }
}

/// Rendered text of an element, markup stripped and outer whitespace trimmed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first descendant of `scope` matching `selector`, or an empty string
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}
