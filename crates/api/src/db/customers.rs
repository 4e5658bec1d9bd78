//! Customer database operations.

use sqlx::{PgExecutor, PgPool};

use online_shopping_core::{CustomerId, Email, Phone};

use super::{RepositoryError, like_pattern, restrict_violation};
use crate::models::Customer;
use crate::models::customer::{CustomerChanges, NewCustomer};

/// Internal row type for customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    customer_id: CustomerId,
    name: String,
    email: Email,
    phone: Phone,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            customer_id: row.customer_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
        }
    }
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all customers by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT customer_id, name, email, phone
            FROM customer
            ORDER BY customer_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT customer_id, name, email, phone
            FROM customer
            WHERE customer_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Whether a customer with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM customer WHERE customer_id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Case-insensitive substring search on name, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT customer_id, name, email, phone
            FROM customer
            WHERE name ILIKE $1
            ORDER BY name ASC, customer_id ASC
            ",
        )
        .bind(like_pattern(name))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &NewCustomer) -> Result<Customer, RepositoryError> {
        insert_customer(self.pool, input).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: CustomerId,
        changes: &CustomerChanges,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            UPDATE customer
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone)
            WHERE customer_id = $1
            RETURNING customer_id, name, email, phone
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_ref())
        .bind(changes.phone.as_ref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a customer.
    ///
    /// # Returns
    ///
    /// Returns `true` if the customer was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer still has an
    /// account or orders.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customer WHERE customer_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                restrict_violation(
                    e,
                    "Cannot delete customer because they still have an account or orders.",
                )
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Insert a customer on `executor`, which may be an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn insert_customer<'e>(
    executor: impl PgExecutor<'e>,
    input: &NewCustomer,
) -> Result<Customer, RepositoryError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        r"
        INSERT INTO customer (name, email, phone)
        VALUES ($1, $2, $3)
        RETURNING customer_id, name, email, phone
        ",
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .fetch_one(executor)
    .await?;

    Ok(row.into())
}
