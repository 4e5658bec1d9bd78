//! Core types for the online shopping domain.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;

pub use account::{Password, PasswordError, Username, UsernameError};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::{Price, PriceError};
pub use status::*;
