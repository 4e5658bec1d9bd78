//! Phone number type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// E.164 style: optional `+`, no leading zero, 2-15 digits.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("valid phone regex"));

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not an E.164 style number.
    #[error("Invalid phone number format")]
    InvalidFormat,
}

/// A phone number such as `+12345678901234` or `1234567890`.
///
/// Separators (spaces, dashes, parentheses) are not accepted; clients send
/// digits only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Maximum stored length: a `+` followed by 15 digits.
    pub const MAX_LENGTH: usize = 16;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not an E.164 style number.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if !PHONE_PATTERN.is_match(s) {
            return Err(PhoneError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert!(Phone::parse("+12345678901234").is_ok());
        assert!(Phone::parse("1234567890").is_ok());
        assert!(Phone::parse("12").is_ok());
        assert!(Phone::parse("+123456789012345").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "0123456789",
            "1",
            "+1234567890123456",
            "555-1234",
            "(555) 1234",
            "++15551234",
            "phone",
        ] {
            assert_eq!(
                Phone::parse(input),
                Err(PhoneError::InvalidFormat),
                "{input} should be rejected"
            );
        }
    }
}
