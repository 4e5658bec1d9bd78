//! Integration tests for the product catalog and stock management.
//!
//! These tests require a `PostgreSQL` database at `TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p online-shopping-integration-tests -- --ignored

use axum::http::StatusCode;
use serde_json::{Value, json};

use online_shopping_integration_tests::{TestContext, id_of};

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .map(|items| items.iter().filter_map(|p| p["name"].as_str()).collect())
        .unwrap_or_default()
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_product_create_defaults_stock() {
    let ctx = TestContext::new().await;

    let created = ctx
        .post("/products", json!({"name": "Widget", "price": 10.0}))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["price"], 10.0);
    assert_eq!(created.body["stock_level"], 0);

    let id = id_of(&created.body, "product_id");
    let fetched = ctx.get(&format!("/products/{id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_product_validation() {
    let ctx = TestContext::new().await;

    let negative = ctx
        .post(
            "/products",
            json!({"name": "Widget", "price": -1.0, "stock_level": -3}),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
    assert!(negative.body["fields"]["price"].is_array());
    assert!(negative.body["fields"]["stock_level"].is_array());

    let unnamed = ctx.post("/products", json!({"name": "", "price": 1.0})).await;
    assert_eq!(unnamed.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        unnamed.body["fields"]["name"][0],
        "Shorter than minimum length 1."
    );

    assert_eq!(ctx.get("/products").await.body, json!([]));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_product_update() {
    let ctx = TestContext::new().await;
    let id = ctx.create_product("Widget", 10.0, 5).await;

    let updated = ctx
        .put(&format!("/products/{id}"), json!({"price": 12.5}))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Widget");
    assert_eq!(updated.body["price"], 12.5);
    assert_eq!(updated.body["stock_level"], 5);

    let missing = ctx.put("/products/9999", json!({"price": 1.0})).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_product_search_orders_by_price() {
    let ctx = TestContext::new().await;
    ctx.create_product("Deluxe Widget", 25.0, 1).await;
    ctx.create_product("Widget", 10.0, 1).await;
    ctx.create_product("Gadget", 5.0, 1).await;
    ctx.create_product("widget mini", 7.5, 1).await;

    let response = ctx.get("/products/by-name?name=widget").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        names(&response.body),
        ["widget mini", "Widget", "Deluxe Widget"]
    );

    let missing_term = ctx.get("/products/by-name").await;
    assert_eq!(missing_term.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_product_delete() {
    let ctx = TestContext::new().await;
    let id = ctx.create_product("Widget", 10.0, 5).await;

    let deleted = ctx.delete(&format!("/products/{id}")).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Product successfully deleted!");

    let missing = ctx.delete(&format!("/products/{id}")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_product_in_order_cannot_be_deleted() {
    let ctx = TestContext::new().await;
    let customer_id = ctx.create_customer("Ada", "ada@example.com").await;
    let product_id = ctx.create_product("Widget", 10.0, 5).await;
    ctx.create_order(customer_id, "pending", &[product_id]).await;

    let response = ctx.delete(&format!("/products/{product_id}")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "Cannot delete product because it is part of one or more orders."
    );

    let still_there = ctx.get(&format!("/products/{product_id}")).await;
    assert_eq!(still_there.status, StatusCode::OK);
}

// ============================================================================
// Stock
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_stock_level_get_and_set() {
    let ctx = TestContext::new().await;
    let id = ctx.create_product("Widget", 10.0, 5).await;

    let stock = ctx.get(&format!("/products/{id}/stock")).await;
    assert_eq!(stock.status, StatusCode::OK);
    assert_eq!(stock.body, json!({"product_id": id, "stock_level": 5}));

    let set = ctx
        .put(&format!("/products/{id}/stock"), json!({"stock_level": 42}))
        .await;
    assert_eq!(set.status, StatusCode::OK);
    assert_eq!(set.body["stock_level"], 42);

    let negative = ctx
        .put(&format!("/products/{id}/stock"), json!({"stock_level": -1}))
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let missing = ctx.get("/products/9999/stock").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_restock_raises_only_low_products() {
    let ctx = TestContext::new().await;
    let empty = ctx.create_product("Empty", 1.0, 0).await;
    let low = ctx.create_product("Low", 1.0, 4).await;
    let edge = ctx.create_product("Edge", 1.0, 5).await;
    let plenty = ctx.create_product("Plenty", 1.0, 50).await;

    let response = ctx
        .post(
            "/products/restock",
            json!({"low_level": 5, "restock_amount": 20}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Products restocked successfully");
    assert_eq!(response.body["restocked"], 2);

    for (id, expected) in [(empty, 20), (low, 24), (edge, 5), (plenty, 50)] {
        let stock = ctx.get(&format!("/products/{id}/stock")).await;
        assert_eq!(stock.body["stock_level"], expected, "product {id}");
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_restock_past_max_stock_is_rejected() {
    let ctx = TestContext::new().await;
    let empty = ctx.create_product("Empty", 1.0, 0).await;
    let nearly_full = ctx.create_product("Nearly full", 1.0, 2_147_483_640).await;

    let response = ctx
        .post(
            "/products/restock",
            json!({"low_level": 2_147_483_647, "restock_amount": 20}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "Restock would exceed the maximum stock level."
    );

    // The sweep is all or nothing
    for (id, expected) in [(empty, 0), (nearly_full, 2_147_483_640_i64)] {
        let stock = ctx.get(&format!("/products/{id}/stock")).await;
        assert_eq!(stock.body["stock_level"], expected, "product {id}");
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_restock_uses_configured_defaults() {
    let ctx = TestContext::new().await;
    let low = ctx.create_product("Low", 1.0, 1).await;

    // No body: threshold 5, amount 20
    let response = ctx
        .request(axum::http::Method::POST, "/products/restock", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["products"][0]["product_id"], low);
    assert_eq!(response.body["products"][0]["stock_level"], 21);

    let nothing = ctx
        .post("/products/restock", json!({"low_level": 0}))
        .await;
    assert_eq!(nothing.status, StatusCode::OK);
    assert_eq!(nothing.body["message"], "No products need restocking");
    assert_eq!(nothing.body["restocked"], 0);
}
