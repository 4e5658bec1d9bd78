//! Customer account models and request payloads.
//!
//! Passwords only ever appear here as the plaintext [`Password`] candidate of
//! a request; accounts read back from the database carry no password field at
//! all.

use serde::{Deserialize, Serialize};

use online_shopping_core::{AccountId, CustomerId, Password, Username, ValidationErrors};

use super::Customer;

/// A customer login account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub account_id: AccountId,
    pub username: Username,
    pub customer_id: CustomerId,
}

/// An account together with the customer it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountWithCustomer {
    pub account_id: AccountId,
    pub username: Username,
    pub customer_id: CustomerId,
    pub customer: Customer,
}

/// Validated input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub customer_id: CustomerId,
    pub username: Username,
    pub password: Password,
}

/// Validated partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub customer_id: Option<CustomerId>,
    pub username: Option<Username>,
    pub password: Option<Password>,
}

/// Request body for `POST /accounts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAccountRequest {
    pub customer_id: Option<CustomerId>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CreateAccountRequest {
    /// Validate every field, collecting all errors.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any field is missing or malformed.
    pub fn validate(self) -> Result<NewAccount, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let customer_id = errors.require("customer_id", self.customer_id);
        let username = errors
            .require("username", self.username)
            .and_then(|u| errors.check("username", Username::parse(&u)));
        let password = errors
            .require("password", self.password)
            .and_then(|p| errors.check("password", Password::parse(&p)));

        match (customer_id, username, password) {
            (Some(customer_id), Some(username), Some(password)) if errors.is_empty() => {
                Ok(NewAccount {
                    customer_id,
                    username,
                    password,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Request body for `PUT /accounts/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub customer_id: Option<CustomerId>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UpdateAccountRequest {
    /// Validate the fields present in the request.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any present field is malformed.
    pub fn validate(self) -> Result<AccountChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let changes = AccountChanges {
            customer_id: self.customer_id,
            username: self
                .username
                .and_then(|u| errors.check("username", Username::parse(&u))),
            password: self
                .password
                .and_then(|p| errors.check("password", Password::parse(&p))),
        };

        errors.finish().map(|()| changes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use online_shopping_core::{Email, Phone};

    #[test]
    fn test_create_valid() {
        let request: CreateAccountRequest = serde_json::from_str(
            r#"{"customer_id": 1, "username": "user123", "password": "P@55w0rd!"}"#,
        )
        .unwrap();
        let account = request.validate().unwrap();
        assert_eq!(account.customer_id, CustomerId::new(1));
        assert_eq!(account.username.as_str(), "user123");
        assert_eq!(account.password.expose(), "P@55w0rd!");
    }

    #[test]
    fn test_create_reports_format_errors() {
        let request = CreateAccountRequest {
            customer_id: Some(CustomerId::new(1)),
            username: Some("username".to_string()),
            password: Some("password123".to_string()),
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(
            errors.messages_for("username").collect::<Vec<_>>(),
            ["Invalid username format"]
        );
        assert_eq!(
            errors.messages_for("password").collect::<Vec<_>>(),
            ["Invalid password format"]
        );
    }

    #[test]
    fn test_create_reports_short_values() {
        let request = CreateAccountRequest {
            customer_id: None,
            username: Some("ab1".to_string()),
            password: Some("a1@".to_string()),
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.messages_for("username").collect::<Vec<_>>(),
            ["Shorter than minimum length 6."]
        );
    }

    #[test]
    fn test_update_validates_only_present_fields() {
        let changes = UpdateAccountRequest {
            password: Some("Password1@".to_string()),
            ..UpdateAccountRequest::default()
        }
        .validate()
        .unwrap();
        assert!(changes.username.is_none());
        assert!(changes.password.is_some());
    }

    #[test]
    fn test_account_serializes_without_password() {
        let account = AccountWithCustomer {
            account_id: AccountId::new(3),
            username: Username::parse("user123").unwrap(),
            customer_id: CustomerId::new(1),
            customer: Customer {
                customer_id: CustomerId::new(1),
                name: "Ada".to_string(),
                email: Email::parse("ada@example.com").unwrap(),
                phone: Phone::parse("1234567890").unwrap(),
            },
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["customer"]["email"], "ada@example.com");
    }
}
