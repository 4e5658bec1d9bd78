//! Customer route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use online_shopping_core::CustomerId;

use super::{MessageResponse, SearchQuery};
use crate::db::{CustomerRepository, OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::customer::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::models::{Customer, Order};
use crate::state::AppState;

/// Build the customer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list).post(create))
        .route("/customers/by-name", get(search))
        .route("/customers/{id}", get(show).put(update).delete(remove))
        .route("/customers/{id}/orders", get(orders))
}

fn not_found() -> AppError {
    AppError::NotFound("Customer not found".to_string())
}

/// List all customers.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Customer>>> {
    let customers = CustomerRepository::new(state.pool()).list().await?;
    Ok(Json(customers))
}

/// Get a customer by ID.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the customer doesn't exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<Json<Customer>> {
    CustomerRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Search customers by partial, case-insensitive name.
///
/// # Errors
///
/// Returns `AppError::Validation` if `name` is missing.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<Customer>>> {
    let name = query.required_name()?;
    let customers = CustomerRepository::new(state.pool())
        .search_by_name(&name)
        .await?;
    Ok(Json(customers))
}

/// Create a customer.
///
/// # Errors
///
/// Returns `AppError::Validation` if the request is invalid.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>)> {
    let input = body.validate()?;
    let customer = CustomerRepository::new(state.pool()).create(&input).await?;

    tracing::info!(customer_id = %customer.customer_id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Update the fields present in the request.
///
/// # Errors
///
/// Returns `AppError::Validation` if a present field is invalid.
/// Returns `AppError::NotFound` if the customer doesn't exist.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
    ApiJson(body): ApiJson<UpdateCustomerRequest>,
) -> Result<Json<Customer>> {
    let changes = body.validate()?;
    let customer = CustomerRepository::new(state.pool())
        .update(id, &changes)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => other.into(),
        })?;

    Ok(Json(customer))
}

/// Delete a customer.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the customer doesn't exist.
/// Returns `AppError::BadRequest` if the customer still has an account or orders.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<Json<MessageResponse>> {
    if !CustomerRepository::new(state.pool()).delete(id).await? {
        return Err(not_found());
    }

    tracing::info!(customer_id = %id, "Customer deleted");
    Ok(Json(MessageResponse::new("Customer removed successfully!")))
}

/// A customer's order history, oldest first.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the customer doesn't exist.
#[instrument(skip(state))]
pub async fn orders(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<Json<Vec<Order>>> {
    if !CustomerRepository::new(state.pool()).exists(id).await? {
        return Err(not_found());
    }

    let orders = OrderRepository::new(state.pool())
        .list_for_customer(id)
        .await?;
    Ok(Json(orders))
}
