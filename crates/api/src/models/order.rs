//! Order domain models and request payloads.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use online_shopping_core::{CustomerId, OrderId, OrderStatus, Price, ProductId, ValidationErrors};

/// Wire format of order dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An order with the products it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub order_id: OrderId,
    pub date: NaiveDate,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub products: Vec<OrderProduct>,
}

impl Order {
    /// Sum of the current prices of the order's products.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.products.iter().map(|p| p.price).sum()
    }
}

/// A product as listed inside an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderProduct {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
}

/// Response body for `GET /orders/{id}/total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotal {
    pub order_id: OrderId,
    pub total_price: Price,
}

impl From<&Order> for OrderTotal {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            total_price: order.total_price(),
        }
    }
}

/// Validated input for placing an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub date: NaiveDate,
    pub status: OrderStatus,
    /// Distinct product IDs in request order.
    pub product_ids: Vec<ProductId>,
}

/// Validated partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub customer_id: Option<CustomerId>,
    pub date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
    /// Replacement product set, distinct and in request order.
    pub product_ids: Option<Vec<ProductId>>,
}

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Option<CustomerId>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub product_ids: Option<Vec<ProductId>>,
}

impl CreateOrderRequest {
    /// Validate every field, collecting all errors. `status` defaults to
    /// `pending`.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any field is missing or malformed.
    pub fn validate(self) -> Result<NewOrder, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let customer_id = errors.require("customer_id", self.customer_id);
        let date = errors
            .require("date", self.date)
            .and_then(|d| errors.check("date", parse_date(&d)));
        let status = match self.status {
            Some(s) => errors.check("status", s.parse::<OrderStatus>()),
            None => Some(OrderStatus::default()),
        };
        let product_ids = errors.require("product_ids", self.product_ids);

        match (customer_id, date, status, product_ids) {
            (Some(customer_id), Some(date), Some(status), Some(product_ids))
                if errors.is_empty() =>
            {
                Ok(NewOrder {
                    customer_id,
                    date,
                    status,
                    product_ids: distinct(product_ids),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Request body for `PUT /orders/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrderRequest {
    pub customer_id: Option<CustomerId>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub product_ids: Option<Vec<ProductId>>,
}

impl UpdateOrderRequest {
    /// Validate the fields present in the request.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any present field is malformed.
    pub fn validate(self) -> Result<OrderChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let changes = OrderChanges {
            customer_id: self.customer_id,
            date: self.date.and_then(|d| errors.check("date", parse_date(&d))),
            status: self
                .status
                .and_then(|s| errors.check("status", s.parse::<OrderStatus>())),
            product_ids: self.product_ids.map(distinct),
        };

        errors.finish().map(|()| changes)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| "Not a valid date.")
}

/// Drop repeated IDs, keeping the first occurrence of each.
fn distinct(ids: Vec<ProductId>) -> Vec<ProductId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
