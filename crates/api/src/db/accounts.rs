//! Customer account database operations.

use sqlx::{PgExecutor, PgPool};

use online_shopping_core::{AccountId, CustomerId, Email, Phone, Username};

use super::{RepositoryError, unique_violation};
use crate::models::account::{AccountChanges, NewAccount};
use crate::models::{Account, AccountWithCustomer, Customer};

const USERNAME_TAKEN: &str = "Username is already taken.";
const CUSTOMER_HAS_ACCOUNT: &str = "Customer already has an account.";

/// Unique constraints of `customer_account` and the message each reports.
const UNIQUE_MESSAGES: &[(&str, &str)] = &[
    ("customer_account_username_key", USERNAME_TAKEN),
    ("customer_account_customer_id_key", CUSTOMER_HAS_ACCOUNT),
];

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for account queries.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    account_id: AccountId,
    username: String,
    customer_id: CustomerId,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            account_id: row.account_id,
            username: parse_stored_username(&row.username)?,
            customer_id: row.customer_id,
        })
    }
}

/// Internal row type for an account joined with its customer.
#[derive(Debug, sqlx::FromRow)]
struct AccountWithCustomerRow {
    account_id: AccountId,
    username: String,
    customer_id: CustomerId,
    name: String,
    email: Email,
    phone: Phone,
}

impl TryFrom<AccountWithCustomerRow> for AccountWithCustomer {
    type Error = RepositoryError;

    fn try_from(row: AccountWithCustomerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            account_id: row.account_id,
            username: parse_stored_username(&row.username)?,
            customer_id: row.customer_id,
            customer: Customer {
                customer_id: row.customer_id,
                name: row.name,
                email: row.email,
                phone: row.phone,
            },
        })
    }
}

fn parse_stored_username(username: &str) -> Result<Username, RepositoryError> {
    Username::parse(username)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid stored username: {e}")))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all accounts by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored username is invalid.
    pub async fn list(&self) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT account_id, username, customer_id
            FROM customer_account
            ORDER BY account_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an account with its customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get(&self, id: AccountId) -> Result<Option<AccountWithCustomer>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithCustomerRow>(
            r"
            SELECT a.account_id, a.username, a.customer_id, c.name, c.email, c.phone
            FROM customer_account a
            JOIN customer c ON c.customer_id = a.customer_id
            WHERE a.account_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an account with an already hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken or the
    /// customer already has an account.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        input: &NewAccount,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        insert_account(self.pool, input, password_hash).await
    }

    /// Apply a partial update; `password_hash` replaces the stored hash when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new username is taken or the
    /// new customer already has an account.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: AccountId,
        changes: &AccountChanges,
        password_hash: Option<&str>,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            UPDATE customer_account
            SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                customer_id = COALESCE($4, customer_id)
            WHERE account_id = $1
            RETURNING account_id, username, customer_id
            ",
        )
        .bind(id)
        .bind(changes.username.as_ref().map(Username::as_str))
        .bind(password_hash)
        .bind(changes.customer_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| unique_violation(e, UNIQUE_MESSAGES, USERNAME_TAKEN))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete an account.
    ///
    /// # Returns
    ///
    /// Returns `true` if the account was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: AccountId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customer_account WHERE account_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Insert an account on `executor`, which may be an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the username is taken or the
/// customer already has an account.
/// Returns `RepositoryError::Database` if the query fails.
pub async fn insert_account<'e>(
    executor: impl PgExecutor<'e>,
    input: &NewAccount,
    password_hash: &str,
) -> Result<Account, RepositoryError> {
    let row = sqlx::query_as::<_, AccountRow>(
        r"
        INSERT INTO customer_account (username, password_hash, customer_id)
        VALUES ($1, $2, $3)
        RETURNING account_id, username, customer_id
        ",
    )
    .bind(input.username.as_str())
    .bind(password_hash)
    .bind(input.customer_id)
    .fetch_one(executor)
    .await
    .map_err(|e| unique_violation(e, UNIQUE_MESSAGES, USERNAME_TAKEN))?;

    row.try_into()
}
