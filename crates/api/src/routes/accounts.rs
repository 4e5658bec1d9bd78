//! Customer account route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use online_shopping_core::{AccountId, CustomerId};

use super::MessageResponse;
use crate::db::{AccountRepository, CustomerRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::models::account::{CreateAccountRequest, UpdateAccountRequest};
use crate::models::{Account, AccountWithCustomer};
use crate::services::password::hash_password;
use crate::state::AppState;

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list).post(create))
        .route("/accounts/{id}", get(show).put(update).delete(remove))
}

fn not_found() -> AppError {
    AppError::NotFound("Customer account not found".to_string())
}

async fn ensure_customer(state: &AppState, id: CustomerId) -> Result<()> {
    if CustomerRepository::new(state.pool()).exists(id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Customer not found".to_string()))
    }
}

/// List all accounts.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Account>>> {
    let accounts = AccountRepository::new(state.pool()).list().await?;
    Ok(Json(accounts))
}

/// Get an account with its customer.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the account doesn't exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AccountId>,
) -> Result<Json<AccountWithCustomer>> {
    AccountRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Create an account for an existing customer.
///
/// # Errors
///
/// Returns `AppError::Validation` if the request is invalid.
/// Returns `AppError::NotFound` if the customer doesn't exist.
/// Returns `AppError::BadRequest` if the username is taken or the customer
/// already has an account.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    let input = body.validate()?;
    ensure_customer(&state, input.customer_id).await?;

    let password_hash = hash_password(&input.password)?;
    let account = AccountRepository::new(state.pool())
        .create(&input, &password_hash)
        .await?;

    tracing::info!(
        account_id = %account.account_id,
        customer_id = %account.customer_id,
        "Customer account created"
    );
    Ok((StatusCode::CREATED, Json(account)))
}

/// Update the fields present in the request.
///
/// # Errors
///
/// Returns `AppError::Validation` if a present field is invalid.
/// Returns `AppError::NotFound` if the account or the new customer doesn't exist.
/// Returns `AppError::BadRequest` if the new username is taken or the new
/// customer already has an account.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AccountId>,
    ApiJson(body): ApiJson<UpdateAccountRequest>,
) -> Result<Json<Account>> {
    let changes = body.validate()?;
    if let Some(customer_id) = changes.customer_id {
        ensure_customer(&state, customer_id).await?;
    }

    let password_hash = changes.password.as_ref().map(hash_password).transpose()?;
    let account = AccountRepository::new(state.pool())
        .update(id, &changes, password_hash.as_deref())
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => other.into(),
        })?;

    Ok(Json(account))
}

/// Delete an account.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the account doesn't exist.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AccountId>,
) -> Result<Json<MessageResponse>> {
    if !AccountRepository::new(state.pool()).delete(id).await? {
        return Err(not_found());
    }

    tracing::info!(account_id = %id, "Customer account deleted");
    Ok(Json(MessageResponse::new(
        "Customer account removed successfully",
    )))
}
