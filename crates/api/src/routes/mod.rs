//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Welcome text
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness (database reachable)
//!
//! # Customers
//! GET  /customers               - List customers
//! POST /customers               - Create customer
//! GET  /customers/by-name?name= - Search by name
//! GET  /customers/{id}          - Customer detail
//! PUT  /customers/{id}          - Update customer
//! DELETE /customers/{id}        - Delete customer
//! GET  /customers/{id}/orders   - Order history
//!
//! # Accounts
//! GET  /accounts                - List accounts
//! POST /accounts                - Create account
//! GET  /accounts/{id}           - Account detail with customer
//! PUT  /accounts/{id}           - Update account
//! DELETE /accounts/{id}         - Delete account
//!
//! # Products
//! GET  /products                - List products
//! POST /products                - Create product
//! GET  /products/by-name?name=  - Search by name
//! POST /products/restock        - Restock low products
//! GET  /products/{id}           - Product detail
//! PUT  /products/{id}           - Update product
//! DELETE /products/{id}         - Delete product
//! GET  /products/{id}/stock     - Stock level
//! PUT  /products/{id}/stock     - Set stock level
//!
//! # Orders
//! GET  /orders                  - List orders
//! POST /orders                  - Place order
//! GET  /orders/{id}             - Order detail
//! PUT  /orders/{id}             - Update order
//! DELETE /orders/{id}           - Delete order
//! PUT  /orders/{id}/cancel      - Cancel order
//! GET  /orders/{id}/total       - Order total
//! ```

pub mod accounts;
pub mod customers;
pub mod orders;
pub mod products;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use online_shopping_core::ValidationErrors;
use online_shopping_core::validation::MISSING_FIELD;

use crate::state::AppState;

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(customers::router())
        .merge(accounts::router())
        .merge(products::router())
        .merge(orders::router())
}

/// Body of responses that only carry a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query string of the `by-name` search endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

impl SearchQuery {
    /// The search term.
    ///
    /// # Errors
    ///
    /// Returns a field error if `name` is absent.
    pub fn required_name(self) -> Result<String, ValidationErrors> {
        self.name
            .ok_or_else(|| ValidationErrors::single("name", MISSING_FIELD))
    }
}

async fn home() -> &'static str {
    "Welcome to E-Commerce API!"
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
