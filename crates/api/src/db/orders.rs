//! Order database operations.
//!
//! An order's products live in the `order_product` join table. Every read
//! loads the order rows first and then their products in a single
//! `= ANY($1)` query; every write touching both tables runs in one
//! transaction.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use sqlx::{PgConnection, PgExecutor, PgPool};
use thiserror::Error;

use online_shopping_core::{CustomerId, OrderId, OrderStatus, Price, ProductId};

use super::{RepositoryError, restrict_violation};
use crate::models::order::{NewOrder, OrderChanges};
use crate::models::{Order, OrderProduct};

/// Errors specific to order writes.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The referenced customer does not exist.
    #[error("Customer with ID {0} not found")]
    CustomerNotFound(CustomerId),

    /// A referenced product does not exist.
    #[error("Product with ID {0} not found")]
    ProductNotFound(ProductId),

    /// The order is shipped or completed.
    #[error("Order cannot be canceled")]
    NotCancelable(OrderStatus),

    /// Repository/database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: OrderId,
    date: NaiveDate,
    customer_id: CustomerId,
    status: OrderStatus,
}

/// Internal row type for the products of an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderProductRow {
    order_id: OrderId,
    product_id: ProductId,
    name: String,
    price: Price,
}

impl From<OrderProductRow> for OrderProduct {
    fn from(row: OrderProductRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            price: row.price,
        }
    }
}

const ORDER_COLUMNS: &str = "order_id, date, customer_id, status";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM customer_order ORDER BY order_id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(attach_products(self.pool, rows).await?)
    }

    /// List a customer's orders by date, then ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM customer_order
            WHERE customer_id = $1
            ORDER BY date ASC, order_id ASC
            "
        ))
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(attach_products(self.pool, rows).await?)
    }

    /// Get an order with its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let Some(row) = fetch_order(self.pool, id).await? else {
            return Ok(None);
        };

        Ok(attach_products(self.pool, vec![row]).await?.pop())
    }

    /// Place an order and link its products.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::CustomerNotFound` or `OrderError::ProductNotFound`
    /// (naming the first missing ID) if a reference is dangling; nothing is
    /// written in that case.
    /// Returns `OrderError::Repository` if a query fails.
    pub async fn create(&self, input: &NewOrder) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;
        let order = insert_order(&mut tx, input).await?;
        tx.commit().await?;

        Ok(order)
    }

    /// Apply a partial update; `product_ids` replaces the whole product set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` (wrapped) if the order doesn't exist.
    /// Returns `OrderError::CustomerNotFound` or `OrderError::ProductNotFound`
    /// if a new reference is dangling; nothing is written in that case.
    /// Returns `OrderError::Repository` if a query fails.
    pub async fn update(&self, id: OrderId, changes: &OrderChanges) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;

        if let Some(customer_id) = changes.customer_id {
            ensure_customer(&mut *tx, customer_id).await?;
        }
        if let Some(product_ids) = &changes.product_ids {
            ensure_products(&mut *tx, product_ids).await?;
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE customer_order
            SET
                date = COALESCE($2, date),
                customer_id = COALESCE($3, customer_id),
                status = COALESCE($4, status)
            WHERE order_id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.date)
        .bind(changes.customer_id)
        .bind(changes.status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(product_ids) = &changes.product_ids {
            sqlx::query("DELETE FROM order_product WHERE order_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_products(&mut *tx, id, product_ids).await?;
        }

        let order = attach_products(&mut *tx, vec![row])
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(order)
    }

    /// Cancel an order unless it has shipped or completed.
    ///
    /// Canceling an already canceled order succeeds without changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` (wrapped) if the order doesn't exist.
    /// Returns `OrderError::NotCancelable` if the order is shipped or completed.
    /// Returns `OrderError::Repository` if a query fails.
    pub async fn cancel(&self, id: OrderId) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;

        let status = sqlx::query_scalar::<_, OrderStatus>(
            "SELECT status FROM customer_order WHERE order_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if !status.can_cancel() {
            return Err(OrderError::NotCancelable(status));
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE customer_order
            SET status = $2
            WHERE order_id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(OrderStatus::Canceled)
        .fetch_one(&mut *tx)
        .await?;

        let order = attach_products(&mut *tx, vec![row])
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(order)
    }

    /// Delete an order.
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order still contains products.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customer_order WHERE order_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                restrict_violation(
                    e,
                    "Cannot delete order because it contains one or more products.",
                )
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Place an order on `conn` without committing; the caller owns the transaction.
///
/// # Errors
///
/// Same as [`OrderRepository::create`].
pub async fn insert_order(conn: &mut PgConnection, input: &NewOrder) -> Result<Order, OrderError> {
    ensure_customer(&mut *conn, input.customer_id).await?;
    ensure_products(&mut *conn, &input.product_ids).await?;

    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r"
        INSERT INTO customer_order (date, customer_id, status)
        VALUES ($1, $2, $3)
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(input.date)
    .bind(input.customer_id)
    .bind(input.status)
    .fetch_one(&mut *conn)
    .await?;

    link_products(&mut *conn, row.order_id, &input.product_ids).await?;

    let order = attach_products(&mut *conn, vec![row])
        .await?
        .pop()
        .ok_or_else(|| RepositoryError::DataCorruption("inserted order vanished".to_owned()))?;

    Ok(order)
}

// =============================================================================
// Helpers
// =============================================================================

async fn fetch_order<'e>(
    executor: impl PgExecutor<'e>,
    id: OrderId,
) -> Result<Option<OrderRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM customer_order WHERE order_id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Load the products of `rows` and assemble the orders, keeping row order.
async fn attach_products<'e>(
    executor: impl PgExecutor<'e>,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, sqlx::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = rows.iter().map(|r| r.order_id.as_i32()).collect();
    let product_rows = sqlx::query_as::<_, OrderProductRow>(
        r"
        SELECT op.order_id, p.product_id, p.name, p.price
        FROM order_product op
        JOIN product p ON p.product_id = op.product_id
        WHERE op.order_id = ANY($1)
        ORDER BY op.order_id, p.product_id
        ",
    )
    .bind(order_ids)
    .fetch_all(executor)
    .await?;

    let mut products: HashMap<OrderId, Vec<OrderProduct>> = HashMap::new();
    for row in product_rows {
        products.entry(row.order_id).or_default().push(row.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| Order {
            products: products.remove(&row.order_id).unwrap_or_default(),
            order_id: row.order_id,
            date: row.date,
            customer_id: row.customer_id,
            status: row.status,
        })
        .collect())
}

async fn ensure_customer<'e>(
    executor: impl PgExecutor<'e>,
    customer_id: CustomerId,
) -> Result<(), OrderError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM customer WHERE customer_id = $1)",
    )
    .bind(customer_id)
    .fetch_one(executor)
    .await?;

    if exists {
        Ok(())
    } else {
        Err(OrderError::CustomerNotFound(customer_id))
    }
}

/// Fail with the first ID in `product_ids` that has no product row.
async fn ensure_products<'e>(
    executor: impl PgExecutor<'e>,
    product_ids: &[ProductId],
) -> Result<(), OrderError> {
    if product_ids.is_empty() {
        return Ok(());
    }

    let ids: Vec<i32> = product_ids.iter().map(ProductId::as_i32).collect();
    let found: HashSet<ProductId> = sqlx::query_scalar::<_, ProductId>(
        "SELECT product_id FROM product WHERE product_id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(executor)
    .await?
    .into_iter()
    .collect();

    match product_ids.iter().find(|id| !found.contains(id)) {
        Some(&missing) => Err(OrderError::ProductNotFound(missing)),
        None => Ok(()),
    }
}

async fn link_products<'e>(
    executor: impl PgExecutor<'e>,
    order_id: OrderId,
    product_ids: &[ProductId],
) -> Result<(), sqlx::Error> {
    if product_ids.is_empty() {
        return Ok(());
    }

    let ids: Vec<i32> = product_ids.iter().map(ProductId::as_i32).collect();
    sqlx::query(
        r"
        INSERT INTO order_product (order_id, product_id)
        SELECT $1, UNNEST($2::int4[])
        ",
    )
    .bind(order_id)
    .bind(ids)
    .execute(executor)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_error_messages() {
        assert_eq!(
            OrderError::ProductNotFound(ProductId::new(7)).to_string(),
            "Product with ID 7 not found"
        );
        assert_eq!(
            OrderError::CustomerNotFound(CustomerId::new(3)).to_string(),
            "Customer with ID 3 not found"
        );
        assert_eq!(
            OrderError::NotCancelable(OrderStatus::Shipped).to_string(),
            "Order cannot be canceled"
        );
    }

    #[test]
    fn test_sqlx_error_wraps_as_database() {
        let err = OrderError::from(sqlx::Error::RowNotFound);
        assert!(matches!(
            err,
            OrderError::Repository(RepositoryError::Database(_))
        ));
    }
}
