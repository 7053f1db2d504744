pub mod canonical;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod events;
pub mod frontier;
pub mod logging;
pub mod models;
pub mod network;
pub mod parser;
pub mod tracker;
pub mod visited;

// Re-export main types for library usage
pub use canonical::{canonicalize, CanonicalUrl, RejectReason};
pub use config::{ConfigError, CrawlConfig};
pub use crawler::Crawler;
pub use events::{EventSink, NullSink, TracingSink};
pub use frontier::{Admission, Frontier, FrontierEntry};
pub use models::{CrawlOutcome, CrawlReport, RejectedLink};
pub use network::{FetchError, Fetcher, HttpFetcher};
pub use parser::{HtmlLinkExtractor, LinkExtractor, ParseError};
pub use tracker::TerminationTracker;
pub use visited::VisitedSet;
