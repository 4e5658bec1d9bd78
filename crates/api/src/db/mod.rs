//! Database operations for the shop `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `customer` - Customer contact details
//! - `customer_account` - Login accounts (one per customer, Argon2 password hashes)
//! - `product` - Catalog with price and stock level
//! - `customer_order` - Orders placed by customers
//! - `order_product` - Products contained in each order
//!
//! Every foreign key is `ON DELETE RESTRICT`: deleting a referenced row fails
//! with [`RepositoryError::Conflict`] instead of cascading.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p online-shopping-cli -- migrate
//! ```

pub mod accounts;
pub mod customers;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::config::PoolConfig;

pub use accounts::{AccountRepository, insert_account};
pub use customers::{CustomerRepository, insert_customer};
pub use orders::{OrderRepository, insert_order};
pub use products::{ProductRepository, insert_product};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username, restricted delete).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `pool` - Pool sizing
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    pool: PoolConfig,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a foreign key violation to [`RepositoryError::Conflict`] with `message`.
pub(crate) fn restrict_violation(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Map a unique violation to [`RepositoryError::Conflict`].
///
/// `messages` pairs constraint names with the message to report; a violation
/// of any other unique constraint reports `fallback`.
pub(crate) fn unique_violation(
    e: sqlx::Error,
    messages: &[(&str, &str)],
    fallback: &str,
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let message = db_err
            .constraint()
            .and_then(|name| messages.iter().find(|(c, _)| *c == name))
            .map_or(fallback, |(_, m)| *m);
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Map a numeric overflow (SQLSTATE `22003`) to [`RepositoryError::Conflict`].
pub(crate) fn out_of_range(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE)
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Escape `LIKE` metacharacters so `term` matches literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
