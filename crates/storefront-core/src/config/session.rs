//! Session and signup lifecycle configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound for `pending_ttl_hours` (30 days).
pub const MAX_PENDING_TTL_HOURS: u64 = 30 * 24;

/// Session-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a pending customer signup, in hours.
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_hours: u64,
    /// Length of generated refresh keys.
    #[serde(default = "default_key_length")]
    pub refresh_key_length: usize,
}

impl SessionConfig {
    /// Validates the session section at startup.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.pending_ttl_hours == 0 || self.pending_ttl_hours > MAX_PENDING_TTL_HOURS {
            return Err(AppError::configuration(format!(
                "session.pending_ttl_hours must be between 1 and {MAX_PENDING_TTL_HOURS}"
            )));
        }
        if self.refresh_key_length == 0 {
            return Err(AppError::configuration(
                "session.refresh_key_length must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pending_ttl_hours: default_pending_ttl(),
            refresh_key_length: default_key_length(),
        }
    }
}

fn default_pending_ttl() -> u64 {
    24
}

fn default_key_length() -> usize {
    32
}
