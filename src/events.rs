//! Fire-and-forget observability hook for crawl events.

use crate::canonical::{CanonicalUrl, RejectReason};
use crate::models::CrawlOutcome;

/// Receives one event per processed URL. Implementations must not block
/// and must not fail; the crawl never waits on its observers.
pub trait EventSink: Send + Sync {
    fn record(&self, url: &CanonicalUrl, depth: u32, outcome: &CrawlOutcome);

    /// A raw link the canonicalizer refused while expanding `page`.
    fn record_rejected(&self, _raw: &str, _page: &CanonicalUrl, _reason: &RejectReason) {}
}

/// Emits crawl events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, url: &CanonicalUrl, depth: u32, outcome: &CrawlOutcome) {
        match outcome {
            CrawlOutcome::Fetched { links } => {
                tracing::debug!(url = %url, depth, links, "fetched");
            }
            CrawlOutcome::FetchFailed { reason } => {
                tracing::warn!(url = %url, depth, reason, "fetch failed");
            }
            CrawlOutcome::ParseFailed { reason } => {
                tracing::warn!(url = %url, depth, reason, "parse failed");
            }
        }
    }

    fn record_rejected(&self, raw: &str, page: &CanonicalUrl, reason: &RejectReason) {
        tracing::trace!(raw, page = %page, %reason, "link rejected");
    }
}

/// Discards all events; used in tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _url: &CanonicalUrl, _depth: u32, _outcome: &CrawlOutcome) {}
}
