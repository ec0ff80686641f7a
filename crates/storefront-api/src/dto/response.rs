//! Response DTOs.

use serde::{Deserialize, Serialize};

use storefront_auth::VerifiedIdentity;
use storefront_entity::account::{AccountRole, AdminAccess};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Identity behind a verified access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Email or admin name.
    pub identity: String,
    /// Account role.
    pub role: AccountRole,
    /// Admin access level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<AdminAccess>,
}

impl From<VerifiedIdentity> for VerifyResponse {
    fn from(identity: VerifiedIdentity) -> Self {
        Self {
            identity: identity.identity,
            role: identity.role,
            access: identity.access,
        }
    }
}

/// Result of a logout or revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedResponse {
    /// Whether any session key was removed.
    pub revoked: bool,
}

/// A pending signup awaiting confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    /// Email the signup was made for.
    pub email: String,
    /// Token to present to the confirm endpoint.
    pub confirmation_token: String,
    /// Hours until the signup expires.
    pub expires_in_hours: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Whether the document store answered.
    pub store: bool,
    /// Open websocket connections.
    pub connections: usize,
}

/// Result of a published update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Updated resource id.
    pub id: String,
    /// Number of connections the event was delivered to.
    pub delivered: usize,
}
