//! Retailer Master API server entry point

use anyhow::Context;
use master_api::config::AppConfig;
use master_api::server::ServerBuilder;
use master_api::storage::PooledConnection;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!(
        database = %config.database.redacted_url(),
        max_connections = config.database.max_connections,
        "Connecting to database"
    );

    let conn = PooledConnection::connect(&config.database)
        .await
        .context("unable to connect to database")?;

    ServerBuilder::new()
        .with_connection(conn)
        .serve(&config.server.bind_addr)
        .await
}
