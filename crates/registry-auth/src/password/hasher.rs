//! Argon2id password hashing and verification.
//!
//! Accounts imported from the previous backend carry bcrypt hashes; those
//! still verify, and [`PasswordHasher::needs_rehash`] flags them so the
//! caller can upgrade them after a successful login.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::warn;

use registry_core::error::AppError;

const BCRYPT_PREFIXES: &[&str] = &["$2a$", "$2b$", "$2y$"];

fn is_bcrypt(hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
}

/// Hashes and verifies passwords with salted Argon2id (PHC strings).
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Argon2 PHC strings and bcrypt hashes are understood. Any other
    /// stored value never matches.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        if is_bcrypt(hash) {
            return match bcrypt::verify(password, hash) {
                Ok(matches) => Ok(matches),
                Err(e) => {
                    warn!(error = %e, "Stored bcrypt hash is malformed");
                    Ok(false)
                }
            };
        }

        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is not a valid PHC string");
                return Ok(false);
            }
        };

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(argon2::password_hash::Error::Algorithm) => {
                warn!("Stored password hash uses an unsupported algorithm");
                Ok(false)
            }
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Whether a stored hash should be replaced by a fresh Argon2id hash.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        !hash.starts_with("$argon2id$")
    }
}
