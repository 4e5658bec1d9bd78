//! Domain models and request payloads.
//!
//! Request payloads deserialize with every field optional so that a missing
//! field is reported alongside any malformed ones instead of aborting
//! deserialization. `validate()` turns a payload into the typed input the
//! repositories accept.

pub mod account;
pub mod customer;
pub mod order;
pub mod product;

pub use account::{Account, AccountWithCustomer};
pub use customer::Customer;
pub use order::{Order, OrderProduct, OrderTotal};
pub use product::{Product, RestockReport, StockLevel};

/// Maximum length of customer and product names (width of the `name` columns).
pub const MAX_NAME_LENGTH: usize = 255;

/// Check a customer or product name: non-blank and at most [`MAX_NAME_LENGTH`] characters.
pub(crate) fn validate_name(name: &str) -> Result<String, String> {
    if name.trim().is_empty() {
        return Err("Shorter than minimum length 1.".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Longer than maximum length {MAX_NAME_LENGTH}."));
    }
    Ok(name.to_owned())
}

/// Check a stock level: must not be negative.
pub(crate) fn validate_stock_level(stock_level: i32) -> Result<i32, String> {
    if stock_level < 0 {
        return Err("Must be greater than or equal to 0.".to_string());
    }
    Ok(stock_level)
}
