//! Order route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use tracing::instrument;

use online_shopping_core::OrderId;

use super::MessageResponse;
use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::models::order::{CreateOrderRequest, UpdateOrderRequest};
use crate::models::{Order, OrderTotal};
use crate::state::AppState;

/// Build the order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route("/orders/{id}", get(show).put(update).delete(remove))
        .route("/orders/{id}/cancel", put(cancel))
        .route("/orders/{id}/total", get(total))
}

fn not_found() -> AppError {
    AppError::NotFound("Order not found".to_string())
}

async fn find(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(not_found)
}

/// List all orders with their products.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

/// Get an order with its products.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the order doesn't exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Order>> {
    find(&state, id).await.map(Json)
}

/// Place an order.
///
/// # Errors
///
/// Returns `AppError::Validation` if the request is invalid.
/// Returns `AppError::NotFound` if the customer or a product doesn't exist.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let input = body.validate()?;
    let order = OrderRepository::new(state.pool()).create(&input).await?;

    tracing::info!(
        order_id = %order.order_id,
        customer_id = %order.customer_id,
        products = order.products.len(),
        "Order placed"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// Update the fields present in the request.
///
/// # Errors
///
/// Returns `AppError::Validation` if a present field is invalid.
/// Returns `AppError::NotFound` if the order, the new customer or a new
/// product doesn't exist.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<UpdateOrderRequest>,
) -> Result<Json<Order>> {
    let changes = body.validate()?;
    let order = OrderRepository::new(state.pool())
        .update(id, &changes)
        .await?;

    Ok(Json(order))
}

/// Delete an order.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the order doesn't exist.
/// Returns `AppError::BadRequest` if the order still contains products.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<MessageResponse>> {
    let deleted = OrderRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => other.into(),
        })?;
    if !deleted {
        return Err(not_found());
    }

    tracing::info!(order_id = %id, "Order deleted");
    Ok(Json(MessageResponse::new("Order removed successfully")))
}

/// Cancel an order that has not shipped.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the order doesn't exist.
/// Returns `AppError::BadRequest` if the order is shipped or completed.
#[instrument(skip(state))]
pub async fn cancel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool()).cancel(id).await?;

    tracing::info!(order_id = %id, "Order canceled");
    Ok(Json(order))
}

/// Total of the current prices of an order's products.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the order doesn't exist.
#[instrument(skip(state))]
pub async fn total(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderTotal>> {
    let order = find(&state, id).await?;
    Ok(Json(OrderTotal::from(&order)))
}
