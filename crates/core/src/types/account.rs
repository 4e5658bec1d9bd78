//! Customer account credential types.
//!
//! [`Username`] and [`Password`] enforce the account format rules. A
//! `Password` is only ever the plaintext candidate supplied by a client; it is
//! hashed before storage and has no `Serialize` implementation.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Symbols a password may (and must, at least once) contain.
pub const PASSWORD_SYMBOLS: &str = "@#$%&?!+_-";

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// Shorter than [`Username::MIN_LENGTH`].
    #[error("Shorter than minimum length {min}.")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// Longer than [`Username::MAX_LENGTH`].
    #[error("Longer than maximum length {max}.")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Contains characters other than ASCII letters and digits, or lacks
    /// either a letter or a digit.
    #[error("Invalid username format")]
    InvalidFormat,
}

/// Errors that can occur when parsing a [`Password`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Shorter than [`Password::MIN_LENGTH`].
    #[error("Shorter than minimum length {min}.")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// Longer than [`Password::MAX_LENGTH`].
    #[error("Longer than maximum length {max}.")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Contains a disallowed character, or lacks a letter, digit or symbol.
    #[error("Invalid password format")]
    InvalidFormat,
}

/// A login name such as `user123`.
///
/// ## Constraints
///
/// - At least 6 characters
/// - ASCII letters and digits only
/// - At least one letter and at least one digit
///
/// ```
/// use online_shopping_core::Username;
///
/// assert!(Username::parse("user123").is_ok());
/// assert!(Username::parse("usernm").is_err());  // no digit
/// assert!(Username::parse("user_12").is_err()); // underscore
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum username length.
    pub const MIN_LENGTH: usize = 6;
    /// Maximum username length (width of the `username` column).
    pub const MAX_LENGTH: usize = 255;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input violates the length or format rules.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        check_length(s, Self::MIN_LENGTH, Self::MAX_LENGTH).map_err(|bound| match bound {
            LengthBound::Min(min) => UsernameError::TooShort { min },
            LengthBound::Max(max) => UsernameError::TooLong { max },
        })?;

        let alphanumeric = s.chars().all(|c| c.is_ascii_alphanumeric());
        let has_letter = s.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = s.chars().any(|c| c.is_ascii_digit());

        if !(alphanumeric && has_letter && has_digit) {
            return Err(UsernameError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A plaintext password candidate such as `P@55w0rd!`.
///
/// ## Constraints
///
/// - At least 8 characters
/// - ASCII letters, digits and [`PASSWORD_SYMBOLS`] only
/// - At least one letter, one digit and one symbol
///
/// `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Minimum password length.
    pub const MIN_LENGTH: usize = 8;
    /// Maximum password length accepted for hashing.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `Password` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input violates the length or format rules.
    pub fn parse(s: &str) -> Result<Self, PasswordError> {
        check_length(s, Self::MIN_LENGTH, Self::MAX_LENGTH).map_err(|bound| match bound {
            LengthBound::Min(min) => PasswordError::TooShort { min },
            LengthBound::Max(max) => PasswordError::TooLong { max },
        })?;

        let is_symbol = |c: char| PASSWORD_SYMBOLS.contains(c);
        let allowed = s.chars().all(|c| c.is_ascii_alphanumeric() || is_symbol(c));
        let has_letter = s.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = s.chars().any(|c| c.is_ascii_digit());
        let has_symbol = s.chars().any(is_symbol);

        if !(allowed && has_letter && has_digit && has_symbol) {
            return Err(PasswordError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the plaintext for hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

enum LengthBound {
    Min(usize),
    Max(usize),
}

fn check_length(s: &str, min: usize, max: usize) -> Result<(), LengthBound> {
    let len = s.chars().count();
    if len < min {
        return Err(LengthBound::Min(min));
    }
    if len > max {
        return Err(LengthBound::Max(max));
    }
    Ok(())
}
