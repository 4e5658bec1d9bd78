//! Customer domain models and request payloads.

use serde::{Deserialize, Serialize};

use online_shopping_core::{CustomerId, Email, Phone, ValidationErrors};

use super::validate_name;

/// A customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
}

/// Validated input for creating a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
}

/// Validated partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<Phone>,
}

/// Request body for `POST /customers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CreateCustomerRequest {
    /// Validate every field, collecting all errors.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any field is missing or malformed.
    pub fn validate(self) -> Result<NewCustomer, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors
            .require("name", self.name)
            .and_then(|n| errors.check("name", validate_name(&n)));
        let email = errors
            .require("email", self.email)
            .and_then(|e| errors.check("email", Email::parse(&e)));
        let phone = errors
            .require("phone", self.phone)
            .and_then(|p| errors.check("phone", Phone::parse(&p)));

        match (name, email, phone) {
            (Some(name), Some(email), Some(phone)) if errors.is_empty() => {
                Ok(NewCustomer { name, email, phone })
            }
            _ => Err(errors),
        }
    }
}

/// Request body for `PUT /customers/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UpdateCustomerRequest {
    /// Validate the fields present in the request.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any present field is malformed.
    pub fn validate(self) -> Result<CustomerChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let changes = CustomerChanges {
            name: self
                .name
                .and_then(|n| errors.check("name", validate_name(&n))),
            email: self
                .email
                .and_then(|e| errors.check("email", Email::parse(&e))),
            phone: self
                .phone
                .and_then(|p| errors.check("phone", Phone::parse(&p))),
        };

        errors.finish().map(|()| changes)
    }
}
