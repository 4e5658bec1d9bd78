//! CLI command implementations.

pub mod migrate;
pub mod restock;
pub mod seed;

use online_shopping_api::config::ApiConfig;
use online_shopping_api::db;
use sqlx::PgPool;

/// Load the shared configuration and connect to the database.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the connection fails.
pub async fn connect() -> Result<(ApiConfig, PgPool), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.pool).await?;

    Ok((config, pool))
}
