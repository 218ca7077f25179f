//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! copperleaf-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `COPPERLEAF_DATABASE_URL` - `PostgreSQL` connection string
//! - `COPPERLEAF_SESSION_SECRET` - required by config loading
//!
//! Migration files live in `crates/backend/migrations/` and are embedded at
//! compile time.

/// Run the record-store migrations.
///
/// # Errors
///
/// Returns an error if configuration is missing or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (_config, store) = super::connect().await?;

    tracing::info!("Running migrations...");
    store.migrate().await?;

    tracing::info!("Migrations complete");
    Ok(())
}
