//! uCode Gateway - Main entry point.

use anyhow::Result;
use ucode_common::logging::init_logging;
use ucode_common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_and_validate()?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("uCode Gateway v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(config = ?config.redacted(), "Configuration loaded");

    ucode_gateway::start_server(config).await
}
