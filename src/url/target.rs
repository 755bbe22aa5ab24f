use crate::{ConfigError, CrawlError};
use std::fmt;
use url::Url;

/// An absolute locator for one document
///
/// Targets are created either from the crawl's starting point or by
/// resolving a reference found in a parent document against the parent's
/// own target. They are never relative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetrievalTarget {
    url: Url,
}

impl RetrievalTarget {
    /// Parses an absolute HTTP or HTTPS locator
    ///
    /// # Arguments
    ///
    /// * `url_str` - The absolute URL string
    ///
    /// # Returns
    ///
    /// * `Ok(RetrievalTarget)` - The parsed target
    /// * `Err(ConfigError)` - The string is not an absolute http(s) URL
    ///
    /// # Example
    ///
    /// ```
    /// use statute_crawler::url::RetrievalTarget;
    ///
    /// let target = RetrievalTarget::parse("https://codes.ohio.gov/ohio-revised-code").unwrap();
    /// assert_eq!(target.path(), "/ohio-revised-code");
    /// ```
    pub fn parse(url_str: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(url_str)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", url_str, e)))?;

        Self::from_url(url)
    }

    /// Wraps an already parsed URL, checking that it can be fetched
    pub fn from_url(url: Url) -> Result<Self, ConfigError> {
        check_fetchable(&url).map_err(ConfigError::InvalidUrl)?;
        Ok(Self { url })
    }

    /// Resolves a reference found in this target's document
    ///
    /// Relative references resolve against this target following RFC 3986,
    /// absolute ones replace it. Resolution is deterministic: the same
    /// reference against the same target always yields the same result.
    ///
    /// # Errors
    ///
    /// * `CrawlError::MalformedReference` - The reference cannot be parsed
    /// * `CrawlError::Unfetchable` - The reference parses but does not name an
    ///   http(s) document, e.g. `mailto:` or `javascript:` links
    pub fn resolve(&self, href: &str) -> Result<RetrievalTarget, CrawlError> {
        let url = self
            .url
            .join(href)
            .map_err(|source| CrawlError::MalformedReference {
                base: self.url.to_string(),
                href: href.to_string(),
                source,
            })?;

        check_fetchable(&url).map_err(|message| CrawlError::Unfetchable {
            url: url.to_string(),
            message,
        })?;

        Ok(RetrievalTarget { url })
    }

    /// The underlying URL
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// The URL as a string slice
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The path component, used when reporting progress
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// Checks that a URL names something the HTTP client can retrieve
fn check_fetchable(url: &Url) -> Result<(), String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!(
            "only HTTP and HTTPS targets are supported, got: {}",
            url
        ));
    }

    if url.host_str().is_none() {
        return Err(format!("missing host in {}", url));
    }

    Ok(())
}

impl fmt::Display for RetrievalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.url.fmt(f)
    }
}
