//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Placeholder key shipped in the default config; the server warns when it is in use.
pub const DEVELOPMENT_ENCRYPTION_KEY: &str = "dev-only-key-change-me-012345678";

/// Upper bound for `access_ttl_minutes` (one day).
pub const MAX_ACCESS_TTL_MINUTES: u64 = 24 * 60;

/// Upper bound for `refresh_ttl_days`.
pub const MAX_REFRESH_TTL_DAYS: u64 = 365;

/// Token encryption and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric key for the token cipher. Must be exactly 32 bytes.
    #[serde(default = "default_encryption_key")]
    pub encryption_key: String,
    /// Tag embedded in access tokens to reject tokens minted elsewhere.
    #[serde(default = "default_shared_secret")]
    pub shared_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Minimum password length for new credentials.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl AuthConfig {
    /// Returns the cipher key, checking its length.
    pub fn key_bytes(&self) -> Result<[u8; 32], AppError> {
        let bytes = self.encryption_key.as_bytes();
        <[u8; 32]>::try_from(bytes).map_err(|_| {
            AppError::configuration(format!(
                "auth.encryption_key must be exactly 32 bytes, got {}",
                bytes.len()
            ))
        })
    }

    /// Validates the auth section at startup.
    pub fn validate(&self) -> Result<(), AppError> {
        self.key_bytes()?;
        if self.shared_secret.is_empty() {
            return Err(AppError::configuration("auth.shared_secret must not be empty"));
        }
        if self.access_ttl_minutes == 0 || self.refresh_ttl_days == 0 {
            return Err(AppError::configuration("Token TTLs must be greater than zero"));
        }
        if self.access_ttl_minutes > MAX_ACCESS_TTL_MINUTES {
            return Err(AppError::configuration(format!(
                "auth.access_ttl_minutes must be at most {MAX_ACCESS_TTL_MINUTES}"
            )));
        }
        if self.refresh_ttl_days > MAX_REFRESH_TTL_DAYS {
            return Err(AppError::configuration(format!(
                "auth.refresh_ttl_days must be at most {MAX_REFRESH_TTL_DAYS}"
            )));
        }
        Ok(())
    }

    /// Whether the development placeholder key is configured.
    pub fn uses_development_key(&self) -> bool {
        self.encryption_key == DEVELOPMENT_ENCRYPTION_KEY
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            encryption_key: default_encryption_key(),
            shared_secret: default_shared_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            password_min_length: default_password_min(),
        }
    }
}

fn default_encryption_key() -> String {
    DEVELOPMENT_ENCRYPTION_KEY.to_string()
}

fn default_shared_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    20
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_password_min() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AuthConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.uses_development_key());
    }

    #[test]
    fn test_short_key_rejected() {
        let config = AuthConfig {
            encryption_key: "too-short".to_string(),
            ..AuthConfig::default()
        };
        assert!(config.key_bytes().is_err());
    }

    #[test]
    fn test_ttl_bounds() {
        let rejected = [
            (0, 7),
            (20, 0),
            (MAX_ACCESS_TTL_MINUTES + 1, 7),
            (1 << 40, 7),
            (20, u64::MAX),
        ];
        for (access, refresh) in rejected {
            let config = AuthConfig {
                access_ttl_minutes: access,
                refresh_ttl_days: refresh,
                ..AuthConfig::default()
            };
            assert!(config.validate().is_err(), "accepted {access}m / {refresh}d");
        }

        let config = AuthConfig {
            access_ttl_minutes: MAX_ACCESS_TTL_MINUTES,
            refresh_ttl_days: MAX_REFRESH_TTL_DAYS,
            ..AuthConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
