//! Crawl outcomes and the final report returned by a run.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::canonical::CanonicalUrl;

/// What happened to one crawled URL. Accumulated for reporting; never
/// affects control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// The page was fetched; `links` counts the new URLs this page put on
    /// the frontier (zero for pages at the depth limit).
    Fetched { links: usize },
    FetchFailed { reason: String },
    ParseFailed { reason: String },
}

/// A raw link that the canonicalizer refused. Kept separately from the
/// outcome map because a rejected spelling has no canonical key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLink {
    pub raw: String,
    pub found_on: CanonicalUrl,
    pub reason: String,
}

/// Aggregate result of a crawl run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: CanonicalUrl,
    pub outcomes: HashMap<CanonicalUrl, CrawlOutcome>,
    pub rejected: Vec<RejectedLink>,
    #[serde(skip)]
    pub duration: Duration,
}

impl CrawlReport {
    /// URLs fetched successfully.
    pub fn fetched_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| matches!(o, CrawlOutcome::Fetched { .. }))
            .count()
    }

    /// URLs that failed to fetch or parse.
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.fetched_count()
    }

    /// Write one JSON object per crawled URL, suitable for downstream
    /// ingestion.
    pub fn write_jsonl<P: AsRef<Path>>(&self, output_path: P) -> std::io::Result<()> {
        #[derive(Serialize)]
        struct Line<'a> {
            url: &'a CanonicalUrl,
            #[serde(flatten)]
            outcome: &'a CrawlOutcome,
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(output_path)?;

        for (url, outcome) in &self.outcomes {
            let json = serde_json::to_string(&Line { url, outcome })?;
            writeln!(file, "{}", json)?;
        }

        Ok(())
    }
}

impl std::fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} URLs crawled ({} fetched, {} failed, {} links rejected) in {:.1}s",
            self.outcomes.len(),
            self.fetched_count(),
            self.failed_count(),
            self.rejected.len(),
            self.duration.as_secs_f64()
        )
    }
}
