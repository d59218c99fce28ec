//! Password value object.
//!
//! Wraps an Argon2 PHC string. Plain text never leaves this module.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{DomainError, DomainResult};

/// Hashed password, compared by hash value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plain text password.
    ///
    /// # Errors
    /// Returns `DomainError::Password` if the password is shorter than
    /// `MIN_PASSWORD_LENGTH` characters.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::password(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Rebuild from a stored hash.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Check a plain text candidate. A malformed stored hash never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let password = Password::new("SecurePassword123!").unwrap();

        assert!(password.verify("SecurePassword123!"));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_password_from_hash() {
        let password = Password::new("TestPassword123").unwrap();
        let restored = Password::from_hash(password.as_str());
        assert!(restored.verify("TestPassword123"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let pass1 = Password::new("SamePassword123").unwrap();
        let pass2 = Password::new("SamePassword123").unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify("SamePassword123"));
        assert!(pass2.verify("SamePassword123"));
    }

    #[test]
    fn test_password_too_short() {
        assert!(matches!(
            Password::new("short"),
            Err(DomainError::Password(_))
        ));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let password = Password::from_hash("not-a-phc-string");
        assert!(!password.verify("anything"));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let password = Password::new("12345678").unwrap();
        assert!(!format!("{:?}", password).contains(password.as_str()));
    }
}
