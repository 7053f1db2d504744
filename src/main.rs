use thiserror::Error;

use rust_crawler::cli::Cli;
use rust_crawler::logging;
use rust_crawler::{ConfigError, Crawler};

#[derive(Error, Debug)]
enum MainError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let cli = Cli::parse_args();
    logging::init_logging();

    let config = cli.to_config();
    println!(
        "Crawling {} (depth {}, {} workers, {}s timeout)",
        config.seed, config.max_depth, config.concurrency, config.timeout_secs
    );

    let crawler = Crawler::with_http(config)?;

    // Graceful cancellation: Ctrl+C closes the frontier, workers exit at
    // their next task boundary, and the partial report is still returned.
    let canceller = crawler.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nReceived Ctrl+C, stopping crawl...");
            canceller.stop();
        }
    });

    let report = crawler.run().await?;

    if let Some(path) = &cli.output {
        report.write_jsonl(path)?;
        println!("Wrote outcomes to {}", path.display());
    }

    println!("{}", report);

    Ok(())
}
