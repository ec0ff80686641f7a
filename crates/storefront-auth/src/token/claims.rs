//! Claims carried inside encrypted tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_entity::account::{AccountRole, AdminAccess};

/// Token payload, discriminated by the `typ` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "lowercase")]
pub enum Claims {
    /// Short-lived credential presented on every request.
    Access(AccessClaims),
    /// Long-lived credential exchangeable for new access tokens.
    Refresh(RefreshClaims),
}

/// Access token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the account identity key.
    pub sub: String,
    /// Role the token was issued for.
    pub role: AccountRole,
    /// Admin access level; absent for customers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<AdminAccess>,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Shared-secret tag of the issuing server.
    pub sec: String,
}

/// Refresh token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject: the account identity key.
    pub sub: String,
    /// Role the token was issued for.
    pub role: AccountRole,
    /// Random key that must be present in the account's session list.
    pub key: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl AccessClaims {
    /// Whether the token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl RefreshClaims {
    /// Whether the token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
