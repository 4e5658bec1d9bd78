//! Product catalog and stock database operations.

use sqlx::{PgExecutor, PgPool};

use online_shopping_core::{Price, ProductId};

use super::{RepositoryError, like_pattern, out_of_range, restrict_violation};
use crate::models::product::{NewProduct, ProductChanges, Restock};
use crate::models::{Product, StockLevel};

const RESTOCK_OVERFLOW: &str = "Restock would exceed the maximum stock level.";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: ProductId,
    name: String,
    price: Price,
    stock_level: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            stock_level: row.stock_level,
        }
    }
}

/// Internal row type for stock level queries.
#[derive(Debug, sqlx::FromRow)]
struct StockLevelRow {
    product_id: ProductId,
    stock_level: i32,
}

impl From<StockLevelRow> for StockLevel {
    fn from(row: StockLevelRow) -> Self {
        Self {
            product_id: row.product_id,
            stock_level: row.stock_level,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Product CRUD
    // =========================================================================

    /// List all products by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT product_id, name, price, stock_level
            FROM product
            ORDER BY product_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT product_id, name, price, stock_level
            FROM product
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Case-insensitive substring search on name, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT product_id, name, price, stock_level
            FROM product
            WHERE name ILIKE $1
            ORDER BY price ASC, product_id ASC
            ",
        )
        .bind(like_pattern(name))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        insert_product(self.pool, input).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE product
            SET
                name = COALESCE($2, name),
                price = COALESCE($3, price),
                stock_level = COALESCE($4, stock_level)
            WHERE product_id = $1
            RETURNING product_id, name, price, stock_level
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.price)
        .bind(changes.stock_level)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an order still contains the
    /// product.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE product_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                restrict_violation(
                    e,
                    "Cannot delete product because it is part of one or more orders.",
                )
            })?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Get the stock level of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_stock(&self, id: ProductId) -> Result<Option<StockLevel>, RepositoryError> {
        let row = sqlx::query_as::<_, StockLevelRow>(
            "SELECT product_id, stock_level FROM product WHERE product_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Overwrite the stock level of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_stock(
        &self,
        id: ProductId,
        stock_level: i32,
    ) -> Result<StockLevel, RepositoryError> {
        let row = sqlx::query_as::<_, StockLevelRow>(
            r"
            UPDATE product
            SET stock_level = $2
            WHERE product_id = $1
            RETURNING product_id, stock_level
            ",
        )
        .bind(id)
        .bind(stock_level)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Raise the stock of every product below `restock.low_level` by
    /// `restock.amount` in one transaction.
    ///
    /// # Returns
    ///
    /// The new stock levels of the restocked products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any raised stock level would
    /// overflow, or `RepositoryError::Database` if the query fails. No product
    /// is changed in either case.
    pub async fn restock(&self, restock: Restock) -> Result<Vec<StockLevel>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query_as::<_, StockLevelRow>(
            r"
            UPDATE product
            SET stock_level = stock_level + $2
            WHERE stock_level < $1
            RETURNING product_id, stock_level
            ",
        )
        .bind(restock.low_level)
        .bind(restock.amount)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| out_of_range(e, RESTOCK_OVERFLOW))?;

        tx.commit().await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Insert a product on `executor`, which may be an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn insert_product<'e>(
    executor: impl PgExecutor<'e>,
    input: &NewProduct,
) -> Result<Product, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>(
        r"
        INSERT INTO product (name, price, stock_level)
        VALUES ($1, $2, $3)
        RETURNING product_id, name, price, stock_level
        ",
    )
    .bind(&input.name)
    .bind(input.price)
    .bind(input.stock_level)
    .fetch_one(executor)
    .await?;

    Ok(row.into())
}
