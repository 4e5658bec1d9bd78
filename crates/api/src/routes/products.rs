//! Product catalog and stock route handlers.
//!
//! The stock endpoints (`/products/{id}/stock`, `/products/restock`) are
//! meant for administrators but, like the rest of the API, are not
//! authenticated.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use online_shopping_core::ProductId;

use super::{MessageResponse, SearchQuery};
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::product::{
    CreateProductRequest, RestockRequest, SetStockRequest, UpdateProductRequest,
};
use crate::models::{Product, RestockReport, StockLevel};
use crate::state::AppState;

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/by-name", get(search))
        .route("/products/restock", post(restock))
        .route("/products/{id}", get(show).put(update).delete(remove))
        .route("/products/{id}/stock", get(show_stock).put(set_stock))
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

fn map_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => not_found(),
        other => other.into(),
    }
}

/// List all products.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Get a product by ID.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product doesn't exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Search products by partial, case-insensitive name, cheapest first.
///
/// # Errors
///
/// Returns `AppError::Validation` if `name` is missing.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    let name = query.required_name()?;
    let products = ProductRepository::new(state.pool())
        .search_by_name(&name)
        .await?;
    Ok(Json(products))
}

/// Create a product.
///
/// # Errors
///
/// Returns `AppError::Validation` if the request is invalid.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = body.validate()?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;

    tracing::info!(product_id = %product.product_id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update the fields present in the request.
///
/// # Errors
///
/// Returns `AppError::Validation` if a present field is invalid.
/// Returns `AppError::NotFound` if the product doesn't exist.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let changes = body.validate()?;
    let product = ProductRepository::new(state.pool())
        .update(id, &changes)
        .await
        .map_err(map_not_found)?;

    Ok(Json(product))
}

/// Delete a product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product doesn't exist.
/// Returns `AppError::BadRequest` if an order still contains the product.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<MessageResponse>> {
    if !ProductRepository::new(state.pool()).delete(id).await? {
        return Err(not_found());
    }

    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(MessageResponse::new("Product successfully deleted!")))
}

/// Get the stock level of a product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product doesn't exist.
#[instrument(skip(state))]
pub async fn show_stock(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<StockLevel>> {
    ProductRepository::new(state.pool())
        .get_stock(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Overwrite the stock level of a product.
///
/// # Errors
///
/// Returns `AppError::Validation` if `stock_level` is missing or negative.
/// Returns `AppError::NotFound` if the product doesn't exist.
#[instrument(skip(state))]
pub async fn set_stock(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<SetStockRequest>,
) -> Result<Json<StockLevel>> {
    let stock_level = body.validate()?;
    let stock = ProductRepository::new(state.pool())
        .set_stock(id, stock_level)
        .await
        .map_err(map_not_found)?;

    tracing::info!(product_id = %id, stock_level, "Stock level set");
    Ok(Json(stock))
}

/// Raise the stock of every product below the threshold.
///
/// An empty body uses the configured threshold and amount.
///
/// # Errors
///
/// Returns `AppError::Validation` if the threshold is negative or the amount
/// is below 1.
#[instrument(skip(state))]
pub async fn restock(
    State(state): State<AppState>,
    body: Option<ApiJson<RestockRequest>>,
) -> Result<Json<RestockReport>> {
    let request = body.map(|ApiJson(r)| r).unwrap_or_default();
    let restock = request.validate(state.config().restock)?;

    let restocked = ProductRepository::new(state.pool())
        .restock(restock)
        .await?;

    tracing::info!(
        low_level = restock.low_level,
        amount = restock.amount,
        count = restocked.len(),
        "Restock sweep finished"
    );
    Ok(Json(RestockReport::new(restocked)))
}
