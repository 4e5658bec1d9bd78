//! Business logic layer.
//!
//! Services sit between the route handlers and the repositories when a
//! handler needs more than a single query.

pub mod password;
