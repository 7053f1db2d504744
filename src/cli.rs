use std::path::PathBuf;

use clap::Parser;

use crate::config::CrawlConfig;

/// CLI entry point so users can control the crawler from the command line.
#[derive(Parser, Debug)]
#[command(name = "rust_crawler")]
#[command(about = "A breadth-first web crawler with bounded depth and concurrency")]
#[command(version)]
pub struct Cli {
    #[arg(help = "The seed URL to begin crawling from")]
    pub seed: String,

    #[arg(
        short = 'd',
        long,
        default_value_t = CrawlConfig::DEFAULT_MAX_DEPTH,
        help = "Maximum crawl depth; pages at the limit are fetched but not expanded"
    )]
    pub max_depth: u32,

    #[arg(
        short = 'w',
        long,
        default_value_t = CrawlConfig::DEFAULT_CONCURRENCY,
        help = "Concurrent workers draining the frontier"
    )]
    pub workers: usize,

    #[arg(
        long,
        default_value_t = CrawlConfig::DEFAULT_FRONTIER_CAPACITY,
        help = "Frontier queue bound; discovery blocks (never drops) when full"
    )]
    pub frontier_capacity: usize,

    #[arg(
        short,
        long,
        default_value_t = CrawlConfig::DEFAULT_TIMEOUT_SECS,
        help = "Request timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        short,
        long,
        default_value = CrawlConfig::DEFAULT_USER_AGENT,
        help = "User agent string for requests"
    )]
    pub user_agent: String,

    #[arg(short, long, help = "Write per-URL outcomes to a JSONL file")]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Parse CLI arguments so the rest of the program can rely on
    /// structured options. On error, clap prints help and exits.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> CrawlConfig {
        CrawlConfig {
            seed: self.seed.clone(),
            max_depth: self.max_depth,
            concurrency: self.workers,
            frontier_capacity: self.frontier_capacity,
            timeout_secs: self.timeout,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::try_parse_from(["rust_crawler", "https://example.com"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert_eq!(cli.seed, "https://example.com");
        assert_eq!(cli.max_depth, CrawlConfig::DEFAULT_MAX_DEPTH);
        assert_eq!(cli.workers, CrawlConfig::DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_full_invocation() {
        let cli = Cli::try_parse_from([
            "rust_crawler",
            "https://example.com",
            "--max-depth",
            "4",
            "--workers",
            "8",
            "--frontier-capacity",
            "64",
            "--timeout",
            "30",
            "--user-agent",
            "TestBot/1.0",
            "--output",
            "/tmp/out.jsonl",
        ])
        .unwrap();

        let config = cli.to_config();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.frontier_capacity, 64);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.user_agent, "TestBot/1.0");
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/out.jsonl")));
    }

    #[test]
    fn test_missing_seed_is_usage_error() {
        let cli = Cli::try_parse_from(["rust_crawler"]);
        assert!(cli.is_err());
        assert_eq!(
            cli.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_help_does_not_panic() {
        let cli = Cli::try_parse_from(["rust_crawler", "--help"]);
        assert!(cli.is_err());
        assert_eq!(cli.unwrap_err().kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
