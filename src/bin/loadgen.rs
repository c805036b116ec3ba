use clap::Parser;
use tracing_subscriber::EnvFilter;

use message_cache::loadgen::{self, LoadgenConfig};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = LoadgenConfig::parse();
    tracing::info!(
        "starting {} clients against {:?}",
        config.clients,
        config.targets
    );

    let report = loadgen::run(config).await;

    tracing::info!(
        "load generator stopped: {}/{} clients dead after {} requests",
        report.terminated,
        report.clients,
        report.requests
    );
}
