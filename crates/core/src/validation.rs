//! Field-level validation errors.
//!
//! Request payloads are checked field by field and every problem is
//! collected, so a client sees all rejected fields in one response:
//!
//! ```
//! use online_shopping_core::{Email, ValidationErrors};
//!
//! let mut errors = ValidationErrors::new();
//! let name: Option<String> = errors.require("name", None);
//! let email = errors.check("email", Email::parse("not-an-email"));
//!
//! assert!(name.is_none() && email.is_none());
//! assert_eq!(errors.len(), 2);
//! assert!(errors.finish().is_err());
//! ```

use core::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Message used when a required field is absent or `null`.
pub const MISSING_FIELD: &str = "Missing data for required field.";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the field as it appears in the request body.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

/// A collection of [`FieldError`]s.
///
/// Serializes as a JSON object mapping each field name to its messages, in
/// the order the fields were first rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Create a collection holding one error.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record an error for `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record [`MISSING_FIELD`] when `value` is `None`, passing it through otherwise.
    pub fn require<T>(&mut self, field: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, MISSING_FIELD);
        }
        value
    }

    /// Record the error of a failed parse, returning the parsed value on success.
    pub fn check<T, E: fmt::Display>(
        &mut self,
        field: &'static str,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// The recorded errors in order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages recorded for `field`.
    pub fn messages_for(&self, field: &str) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Succeed if nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one field was rejected.
    pub fn finish(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// One-line description such as `email: Invalid email format`.
    #[must_use]
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn fields_in_order(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field) {
                fields.push(error.field);
            }
        }
        fields
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.fields_in_order();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for field in fields {
            let messages: Vec<&str> = self.messages_for(field).collect();
            map.serialize_entry(field, &messages)?;
        }
        map.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_finishes_ok() {
        assert!(ValidationErrors::new().finish().is_ok());
    }

    #[test]
    fn test_require_records_missing() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.require("name", Some("Ada")), Some("Ada"));
        assert_eq!(errors.require::<&str>("email", None), None);
        assert_eq!(errors.messages_for("email").collect::<Vec<_>>(), [MISSING_FIELD]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_check_records_error_message() {
        let mut errors = ValidationErrors::new();
        let parsed: Option<i32> = errors.check("stock_level", "x".parse::<i32>());
        assert!(parsed.is_none());
        assert_eq!(errors.errors()[0].field, "stock_level");
    }

    #[test]
    fn test_serializes_grouped_in_first_seen_order() {
        let mut errors = ValidationErrors::new();
        errors.add("phone", "Invalid phone number format");
        errors.add("email", "Invalid email format");
        errors.add("phone", "too long");

        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(
            json,
            r#"{"phone":["Invalid phone number format","too long"],"email":["Invalid email format"]}"#
        );
    }

    #[test]
    fn test_summary() {
        let mut errors = ValidationErrors::single("email", "Invalid email format");
        errors.add("name", MISSING_FIELD);
        assert_eq!(
            errors.to_string(),
            "email: Invalid email format; name: Missing data for required field."
        );
    }
}
