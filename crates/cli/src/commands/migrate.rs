//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shop-cli migrate
//! ```
//!
//! Migrations are embedded from `crates/api/migrations/` at build time.

use thiserror::Error;

use online_shopping_api::db::MIGRATOR;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Configuration or connection failure.
    #[error("{0}")]
    Setup(String),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let (_, pool) = super::connect()
        .await
        .map_err(|e| MigrationError::Setup(e.to_string()))?;

    tracing::info!(
        available = MIGRATOR.iter().count(),
        "Running migrations..."
    );
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
