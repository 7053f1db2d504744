//! Tracing setup for the CLI binary.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with environment-based filtering.
///
/// `RUST_LOG` controls the level (default "info"), e.g.
/// `RUST_LOG=rust_crawler=debug,reqwest=warn`. Safe to call more than
/// once; later calls are no-ops.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("Failed to create EnvFilter");

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
