//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (record into span and Sentry scope, echo in response)
//! 4. CORS (all origins)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
