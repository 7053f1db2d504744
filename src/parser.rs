//! Anchor-link extraction, behind the `LinkExtractor` capability.

use scraper::{Html, Selector};

/// Error from a malformed document. Treated by the worker as zero links
/// found; never aborts the crawl.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// Produces the raw link strings found in a fetched page body. Raw means
/// exactly as written in the document; resolution and normalization happen
/// in the canonicalizer.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, body: &str) -> Result<Vec<String>, ParseError>;
}

/// Extracts `href` attributes from `<a>` tags.
pub struct HtmlLinkExtractor {
    selector: Selector,
}

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self {
            selector: Selector::parse("a[href]").expect("Invalid CSS selector"),
        }
    }
}

impl Default for HtmlLinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str) -> Result<Vec<String>, ParseError> {
        let document = Html::parse_document(body);

        let mut links = Vec::new();
        for element in document.select(&self.selector) {
            if let Some(href) = element.value().attr("href") {
                let cleaned = href.trim();

                // Skip empty links and non-navigational schemes.
                if !cleaned.is_empty()
                    && !cleaned.starts_with("javascript:")
                    && !cleaned.starts_with("mailto:")
                    && !cleaned.starts_with("tel:")
                    && !cleaned.starts_with("data:")
                    && !cleaned.starts_with("file:")
                {
                    links.push(cleaned.to_string());
                }
            }
        }

        Ok(links)
    }
}
