//! Online shopping HTTP API.
//!
//! JSON CRUD endpoints for customers, customer accounts, products and
//! orders, backed by `PostgreSQL`.
//!
//! # Architecture
//!
//! - Axum web framework with JSON request/response bodies
//! - `sqlx` repositories, one per table family
//! - Validation into typed inputs before any database access
//! - Argon2 password hashing for customer accounts
//!
//! Migrations are not applied on startup. Run them with
//! `shop-cli migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{ApiConfig, LogFormat, PoolConfig, RestockConfig};
    use crate::middleware::REQUEST_ID_HEADER;

    // The pool never connects; every request below is rejected before a
    // query would run.
    fn test_app() -> Router {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost:1/unused"),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            pool: PoolConfig::default(),
            restock: RestockConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            log_format: LogFormat::Pretty,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/unused")
            .unwrap();
        app(AppState::new(config, pool))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_home() {
        let response = test_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"Welcome to E-Commerce API!");
    }

    #[tokio::test]
    async fn test_health_sets_request_id() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_incoming_request_id_is_echoed() {
        let response = test_app()
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "abc-123"
        );
    }

    #[tokio::test]
    async fn test_malformed_email_is_rejected() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/customers",
                r#"{"name": "Ada", "email": "not-an-email"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["fields"]["email"].is_array());
    }

    #[tokio::test]
    async fn test_search_requires_name() {
        let response = test_app()
            .oneshot(
                Request::get("/customers/by-name")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["fields"]["name"][0], "Missing data for required field.");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_rejected() {
        let response = test_app()
            .oneshot(Request::get("/products/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid path parameter"));
    }

    #[tokio::test]
    async fn test_json_syntax_error_is_rejected() {
        let response = test_app()
            .oneshot(json_request("POST", "/products", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("JSON syntax error"));
    }

    #[tokio::test]
    async fn test_negative_restock_amount_is_rejected() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/products/restock",
                r#"{"low_level": 5, "restock_amount": 0}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_order_with_unknown_status_is_rejected() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/orders",
                r#"{"date": "2024-01-15", "customer_id": 1, "status": "lost"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["fields"]["status"].is_array());
    }
}
