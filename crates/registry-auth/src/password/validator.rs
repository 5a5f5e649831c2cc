//! Password policy enforcement for new passwords.

use registry_core::config::AuthConfig;
use registry_core::error::AppError;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    /// Minimum zxcvbn score; 0 disables the check.
    min_strength: u8,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_strength: config.password_min_strength.min(4),
        }
    }

    /// Returns the first policy violation, if any.
    ///
    /// `user_inputs` are penalized by the strength estimator (typically the
    /// username).
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if self.min_strength > 0 {
            let estimate = zxcvbn::zxcvbn(password, user_inputs);
            if (estimate.score() as u8) < self.min_strength {
                return Err(AppError::validation(
                    "Password is too weak. Please use a longer or less predictable password.",
                ));
            }
        }

        Ok(())
    }
}
