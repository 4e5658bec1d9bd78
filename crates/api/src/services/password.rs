//! Account password hashing.
//!
//! Passwords are stored as Argon2id PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), never in clear.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use online_shopping_core::Password;

/// Errors that can occur while hashing a password.
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing failed.
    #[error("password hashing error")]
    Hash,
}

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordHashError::Hash` if Argon2 fails.
pub fn hash_password(password: &Password) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.expose().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordHashError::Hash)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    fn verifies(password: &str, hash: &str) -> bool {
        PasswordHash::new(hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    #[test]
    fn test_hash_is_phc_string() {
        let password = Password::parse("P@55w0rd!").unwrap();
        let hash = hash_password(&password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("P@55w0rd!"));
    }

    #[test]
    fn test_hash_verifies() {
        let password = Password::parse("Password1@").unwrap();
        let hash = hash_password(&password).unwrap();
        assert!(verifies("Password1@", &hash));
        assert!(!verifies("Password2@", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let password = Password::parse("1234!Abcd").unwrap();
        assert_ne!(
            hash_password(&password).unwrap(),
            hash_password(&password).unwrap()
        );
    }

    #[test]
    fn test_hash_uses_default_parameters() {
        let password = Password::parse("Password1@").unwrap();
        let hash = hash_password(&password).unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert!(parsed.salt.is_some());
    }
}
