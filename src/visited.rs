//! Set of canonical URLs that have ever been admitted to the frontier.

use dashmap::DashSet;

use crate::canonical::CanonicalUrl;

/// Tracks every URL admitted to the frontier. Grows monotonically for the
/// duration of a crawl run.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<CanonicalUrl>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-if-absent as one indivisible step. Returns `true` only for
    /// the first caller to admit `url`; under concurrent calls with the
    /// same URL exactly one caller wins.
    pub fn admit_if_new(&self, url: &CanonicalUrl) -> bool {
        self.urls.insert(url.clone())
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.urls.contains(url)
    }

    /// Number of URLs ever admitted.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
