//! Online Shopping Core - Shared types library.
//!
//! This crate provides the domain types used across all components:
//! - `api` - The HTTP/JSON service
//! - `cli` - Command-line tools for migrations, seeding and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no
//! database access, no HTTP. Every value that crosses the API boundary is
//! parsed into one of these types before it reaches a repository.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, contact details, account
//!   credentials and order statuses
//! - [`validation`] - Field-level validation error collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldError, ValidationErrors};
