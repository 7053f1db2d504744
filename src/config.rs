//! Crawl run configuration.

use thiserror::Error;

use crate::canonical::RejectReason;

/// Errors that make a run impossible to start. Everything else during a
/// crawl is recorded per URL, never raised.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("concurrency must be greater than zero")]
    InvalidConcurrency,

    #[error("frontier capacity must be greater than zero")]
    InvalidCapacity,

    #[error("timeout must be greater than zero")]
    InvalidTimeout,

    #[error("invalid seed URL: {0}")]
    InvalidSeed(#[from] RejectReason),
}

/// Immutable settings for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Raw seed URL; canonicalized (and validated) when the run starts.
    pub seed: String,
    /// Pages at exactly this depth are fetched but not expanded.
    pub max_depth: u32,
    /// Fixed number of workers draining the frontier.
    pub concurrency: usize,
    /// Queue bound; producers block while the frontier is full.
    pub frontier_capacity: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl CrawlConfig {
    pub const DEFAULT_MAX_DEPTH: u32 = 2;
    pub const DEFAULT_CONCURRENCY: usize = 16;
    pub const DEFAULT_FRONTIER_CAPACITY: usize = 1024;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
    pub const DEFAULT_USER_AGENT: &'static str = "RustCrawler/1.0";

    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
            concurrency: Self::DEFAULT_CONCURRENCY,
            frontier_capacity: Self::DEFAULT_FRONTIER_CAPACITY,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        if self.frontier_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CrawlConfig::new("https://test.local");
        assert!(config.validate().is_ok());
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.concurrency, 16);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = CrawlConfig::new("https://test.local");
        config.concurrency = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConcurrency)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = CrawlConfig::new("https://test.local");
        config.frontier_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCapacity)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = CrawlConfig::new("https://test.local");
        config.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout)));
    }
}
