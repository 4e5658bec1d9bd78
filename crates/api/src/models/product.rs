//! Product catalog models and request payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use online_shopping_core::{Price, ProductId, ValidationErrors};

use super::{validate_name, validate_stock_level};
use crate::config::RestockConfig;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub stock_level: i32,
}

/// Stock level of a single product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub stock_level: i32,
}

/// Outcome of a restock sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestockReport {
    pub message: String,
    /// Number of products whose stock was raised.
    pub restocked: usize,
    /// New stock levels of the restocked products, by product ID.
    pub products: Vec<StockLevel>,
}

impl RestockReport {
    /// Build the report for the products a sweep touched.
    #[must_use]
    pub fn new(mut products: Vec<StockLevel>) -> Self {
        products.sort_by_key(|p| p.product_id);
        let message = if products.is_empty() {
            "No products need restocking"
        } else {
            "Products restocked successfully"
        };
        Self {
            message: message.to_string(),
            restocked: products.len(),
            products,
        }
    }
}

/// Validated input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub stock_level: i32,
}

/// Validated partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub stock_level: Option<i32>,
}

/// Validated restock sweep parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restock {
    pub low_level: i32,
    pub amount: i32,
}

/// Request body for `POST /products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub stock_level: Option<i32>,
}

impl CreateProductRequest {
    /// Validate every field, collecting all errors. `stock_level` defaults to 0.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any field is missing or out of range.
    pub fn validate(self) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors
            .require("name", self.name)
            .and_then(|n| errors.check("name", validate_name(&n)));
        let price = errors
            .require("price", self.price)
            .and_then(|p| errors.check("price", Price::new(p)));
        let stock_level = errors.check(
            "stock_level",
            validate_stock_level(self.stock_level.unwrap_or(0)),
        );

        match (name, price, stock_level) {
            (Some(name), Some(price), Some(stock_level)) if errors.is_empty() => Ok(NewProduct {
                name,
                price,
                stock_level,
            }),
            _ => Err(errors),
        }
    }
}

/// Request body for `PUT /products/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub stock_level: Option<i32>,
}

impl UpdateProductRequest {
    /// Validate the fields present in the request.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any present field is out of range.
    pub fn validate(self) -> Result<ProductChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let changes = ProductChanges {
            name: self
                .name
                .and_then(|n| errors.check("name", validate_name(&n))),
            price: self
                .price
                .and_then(|p| errors.check("price", Price::new(p))),
            stock_level: self
                .stock_level
                .and_then(|s| errors.check("stock_level", validate_stock_level(s))),
        };

        errors.finish().map(|()| changes)
    }
}

/// Request body for `PUT /products/{id}/stock`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetStockRequest {
    pub stock_level: Option<i32>,
}

impl SetStockRequest {
    /// Validate the new stock level.
    ///
    /// # Errors
    ///
    /// Returns a field error if the stock level is missing or negative.
    pub fn validate(self) -> Result<i32, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let stock_level = errors
            .require("stock_level", self.stock_level)
            .and_then(|s| errors.check("stock_level", validate_stock_level(s)));
        match stock_level {
            Some(stock_level) if errors.is_empty() => Ok(stock_level),
            _ => Err(errors),
        }
    }
}

/// Request body for `POST /products/restock`. Absent fields fall back to the
/// configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestockRequest {
    pub low_level: Option<i32>,
    pub restock_amount: Option<i32>,
}

impl RestockRequest {
    /// Resolve the sweep parameters against `defaults`.
    ///
    /// # Errors
    ///
    /// Returns field errors if `low_level` is negative or `restock_amount` is
    /// below 1.
    pub fn validate(self, defaults: RestockConfig) -> Result<Restock, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let low_level = self.low_level.unwrap_or(defaults.low_level);
        if low_level < 0 {
            errors.add("low_level", "Must be greater than or equal to 0.");
        }
        let amount = self.restock_amount.unwrap_or(defaults.amount);
        if amount < 1 {
            errors.add("restock_amount", "Must be greater than or equal to 1.");
        }

        errors.finish().map(|()| Restock { low_level, amount })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use online_shopping_core::validation::MISSING_FIELD;

    #[test]
    fn test_create_defaults_stock_level_to_zero() {
        let request: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Laptop", "price": 999.99}"#).unwrap();
        let product = request.validate().unwrap();
        assert_eq!(product.stock_level, 0);
        assert_eq!(product.price, Price::from_cents(99_999).unwrap());
    }

    #[test]
    fn test_create_requires_name_and_price() {
        let errors = CreateProductRequest::default().validate().unwrap_err();
        assert_eq!(errors.messages_for("name").collect::<Vec<_>>(), [MISSING_FIELD]);
        assert_eq!(errors.messages_for("price").collect::<Vec<_>>(), [MISSING_FIELD]);
        assert_eq!(errors.messages_for("stock_level").count(), 0);
    }

    #[test]
    fn test_create_rejects_negative_values() {
        let request: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Mouse", "price": -1, "stock_level": -3}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.messages_for("price").collect::<Vec<_>>(),
            ["Must be greater than or equal to 0."]
        );
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let request: CreateProductRequest =
            serde_json::from_str(r#"{"name": "", "price": 1.5}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_only_present_fields() {
        let request: UpdateProductRequest = serde_json::from_str(r#"{"price": 5.5}"#).unwrap();
        let changes = request.validate().unwrap();
        assert!(changes.name.is_none());
        assert_eq!(changes.price, Some(Price::from_cents(550).unwrap()));
        assert!(changes.stock_level.is_none());
    }

    #[test]
    fn test_set_stock_requires_value() {
        assert!(SetStockRequest::default().validate().is_err());
        assert!(SetStockRequest { stock_level: Some(-1) }.validate().is_err());
        assert_eq!(SetStockRequest { stock_level: Some(7) }.validate().unwrap(), 7);
    }

    #[test]
    fn test_set_stock_rejects_non_integer_body() {
        assert!(serde_json::from_str::<SetStockRequest>(r#"{"stock_level": "ten"}"#).is_err());
        assert!(serde_json::from_str::<SetStockRequest>(r#"{"stock_level": 2.5}"#).is_err());
    }

    #[test]
    fn test_restock_uses_defaults() {
        let restock = RestockRequest::default()
            .validate(RestockConfig::default())
            .unwrap();
        assert_eq!(
            restock,
            Restock {
                low_level: 5,
                amount: 20
            }
        );
    }

    #[test]
    fn test_restock_overrides_and_bounds() {
        let restock = RestockRequest {
            low_level: Some(0),
            restock_amount: Some(1),
        }
        .validate(RestockConfig::default())
        .unwrap();
        assert_eq!(restock.low_level, 0);
        assert_eq!(restock.amount, 1);

        let errors = RestockRequest {
            low_level: Some(-1),
            restock_amount: Some(0),
        }
        .validate(RestockConfig::default())
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_restock_report_message() {
        assert_eq!(RestockReport::new(Vec::new()).message, "No products need restocking");

        let report = RestockReport::new(vec![
            StockLevel {
                product_id: ProductId::new(2),
                stock_level: 21,
            },
            StockLevel {
                product_id: ProductId::new(1),
                stock_level: 24,
            },
        ]);
        assert_eq!(report.restocked, 2);
        assert_eq!(report.products[0].product_id, ProductId::new(1));
        assert_eq!(report.message, "Products restocked successfully");
    }
}
