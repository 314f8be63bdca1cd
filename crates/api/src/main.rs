//! Crime Risk Classifier - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config file from the first argument or CRIME_RISK_CONFIG
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CRIME_RISK_CONFIG").ok());

    let config = AppConfig::load(config_path.as_deref()).context("loading configuration")?;
    init_logging(&config.logging).context("initializing logging")?;

    info!("=== Crime Risk Classifier v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.model.artifact_path);

    run_server(config).await
}
