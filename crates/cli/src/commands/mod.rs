//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use copperleaf_backend::config::BackendConfig;
use copperleaf_backend::store::postgres::PostgresStore;

/// Load environment configuration and connect the Postgres record store.
pub async fn connect() -> Result<(BackendConfig, PostgresStore), Box<dyn std::error::Error>> {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let config = BackendConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let store = PostgresStore::connect(&config.database_url).await?;
    Ok((config, store))
}
