//! Password policy for new credentials.

use storefront_core::config::AuthConfig;
use storefront_core::error::AppError;

/// Checks new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Returns the first policy violation, if any.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if password.trim().is_empty() {
            return Err(AppError::validation("Password must not be blank"));
        }

        if !password.chars().any(|c| c.is_alphabetic())
            || !password.chars().any(|c| !c.is_alphabetic())
        {
            return Err(AppError::validation(
                "Password must mix letters with digits or symbols",
            ));
        }

        Ok(())
    }
}
