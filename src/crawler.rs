//! Coordinator and worker pool for the breadth-first crawl.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinSet;

use crate::canonical::{canonicalize, CanonicalUrl};
use crate::config::{ConfigError, CrawlConfig};
use crate::events::{EventSink, TracingSink};
use crate::frontier::{Admission, Frontier, FrontierEntry};
use crate::models::{CrawlOutcome, CrawlReport, RejectedLink};
use crate::network::{Fetcher, HttpFetcher};
use crate::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::tracker::TerminationTracker;
use crate::visited::VisitedSet;

/// BFS crawler with constructor-injected collaborators for testability.
///
/// All shared state (frontier, visited set, tracker, outcome map) is owned
/// here and handed to workers by reference; nothing is process-global, so
/// independent crawls can run concurrently in one process.
#[derive(Clone)]
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    sink: Arc<dyn EventSink>,
    frontier: Arc<Frontier>,
    visited: Arc<VisitedSet>,
    tracker: Arc<TerminationTracker>,
    outcomes: Arc<DashMap<CanonicalUrl, CrawlOutcome>>,
    rejected: Arc<Mutex<Vec<RejectedLink>>>,
}

impl Crawler {
    /// Create the crawler with the provided collaborators. Fails only on
    /// invalid configuration.
    pub fn new(
        config: CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let visited = Arc::new(VisitedSet::new());
        let tracker = Arc::new(TerminationTracker::new());
        let frontier = Arc::new(Frontier::new(
            config.frontier_capacity,
            Arc::clone(&visited),
            Arc::clone(&tracker),
        ));

        Ok(Self {
            config,
            fetcher,
            extractor,
            sink,
            frontier,
            visited,
            tracker,
            outcomes: Arc::new(DashMap::new()),
            rejected: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Wire up the default HTTP fetcher, HTML extractor, and tracing sink.
    pub fn with_http(config: CrawlConfig) -> Result<Self, ConfigError> {
        let fetcher = Arc::new(HttpFetcher::new(&config.user_agent, config.timeout_secs));
        Self::new(
            config,
            fetcher,
            Arc::new(HtmlLinkExtractor::new()),
            Arc::new(TracingSink),
        )
    }

    /// Run the crawl to completion (or cancellation) and return the
    /// per-URL outcome map. Fails fast only if the seed URL is malformed;
    /// every per-page failure is recorded, not raised.
    pub async fn run(&self) -> Result<CrawlReport, ConfigError> {
        let started = Instant::now();

        let seed = canonicalize(&self.config.seed, None).map_err(ConfigError::InvalidSeed)?;
        tracing::info!(seed = %seed, max_depth = self.config.max_depth,
            workers = self.config.concurrency, "starting crawl");

        // The seed is the first admission; pending becomes 1 before any
        // worker starts, so termination cannot fire early.
        if !matches!(self.frontier.admit(seed.clone(), 0), Admission::Enqueued) {
            tracing::warn!(seed = %seed, "seed not admitted; frontier already closed or seeded");
        }

        let mut workers = JoinSet::new();
        for worker_id in 0..self.config.concurrency {
            let crawler = self.clone();
            workers.spawn(async move { crawler.worker_loop(worker_id).await });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("worker task failed: {}", e);
            }
        }

        let outcomes: HashMap<CanonicalUrl, CrawlOutcome> = self
            .outcomes
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let report = CrawlReport {
            seed,
            outcomes,
            rejected: self.rejected.lock().clone(),
            duration: started.elapsed(),
        };
        tracing::info!(%report, discovered = self.visited.len(), "crawl finished");

        Ok(report)
    }

    /// Cancel the crawl: blocked push/pop calls return immediately and
    /// every worker exits at its next task boundary. In-flight fetches are
    /// not interrupted; their discoveries are discarded by the closed
    /// frontier.
    pub fn stop(&self) {
        tracing::info!("stopping crawl");
        self.frontier.close();
    }

    /// Queued plus in-flight entries; zero exactly once, at completion.
    pub fn pending(&self) -> usize {
        self.tracker.pending()
    }

    /// URLs ever admitted to the frontier, including those not yet fetched.
    pub fn discovered(&self) -> usize {
        self.visited.len()
    }

    async fn worker_loop(&self, worker_id: usize) {
        // Discoveries the frontier deferred because its queue was full.
        // The worker re-offers them between tasks and consumes queued work
        // itself to make room: a worker is both producer and consumer, so
        // waiting for space only it can free would wedge a lone worker.
        let mut deferred: VecDeque<FrontierEntry> = VecDeque::new();

        loop {
            while let Some(entry) = deferred.pop_front() {
                if let Err(entry) = self.frontier.try_push(entry) {
                    deferred.push_front(entry);
                    break;
                }
            }

            let entry = if deferred.is_empty() {
                match self.frontier.pop().await {
                    Some(entry) => entry,
                    None => break,
                }
            } else {
                // Queue still full: take the oldest queued entry ourselves
                // so the next flush attempt finds a free slot.
                match self.frontier.try_pop() {
                    Some(entry) => entry,
                    None if self.frontier.is_closed() => break,
                    None => continue,
                }
            };

            let links_enqueued = self.process_entry(&entry, &mut deferred).await;

            // The worker that settles the last outstanding entry shuts the
            // frontier down so its peers stop waiting for work.
            if self.tracker.on_task_done(links_enqueued) {
                self.frontier.close();
            }
        }
        tracing::debug!(worker_id, "worker exiting");
    }

    /// Fetch, depth-gate, extract, and admit one frontier entry. Returns
    /// the number of new links this task admitted; admissions the frontier
    /// could not queue are parked on `deferred`.
    async fn process_entry(
        &self,
        entry: &FrontierEntry,
        deferred: &mut VecDeque<FrontierEntry>,
    ) -> usize {
        let FrontierEntry { url, depth } = entry;

        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                self.record(url, *depth, CrawlOutcome::FetchFailed { reason: e.to_string() });
                return 0;
            }
        };

        // A page at the depth limit is fetched but never expanded.
        if *depth >= self.config.max_depth {
            self.record(url, *depth, CrawlOutcome::Fetched { links: 0 });
            return 0;
        }

        let raw_links = match self.extractor.extract_links(&body) {
            Ok(links) => links,
            Err(e) => {
                self.record(url, *depth, CrawlOutcome::ParseFailed { reason: e.to_string() });
                return 0;
            }
        };

        let mut links_enqueued = 0;
        for raw in &raw_links {
            match canonicalize(raw, Some(url)) {
                Ok(canon) => match self.frontier.admit(canon, depth + 1) {
                    Admission::Enqueued => links_enqueued += 1,
                    Admission::Deferred(entry) => {
                        deferred.push_back(entry);
                        links_enqueued += 1;
                    }
                    Admission::Duplicate | Admission::Dropped => {}
                },
                Err(reason) => {
                    self.sink.record_rejected(raw, url, &reason);
                    self.rejected.lock().push(RejectedLink {
                        raw: raw.clone(),
                        found_on: url.clone(),
                        reason: reason.to_string(),
                    });
                }
            }
        }

        self.record(url, *depth, CrawlOutcome::Fetched { links: links_enqueued });
        links_enqueued
    }

    fn record(&self, url: &CanonicalUrl, depth: u32, outcome: CrawlOutcome) {
        self.sink.record(url, depth, &outcome);
        self.outcomes.insert(url.clone(), outcome);
    }
}
