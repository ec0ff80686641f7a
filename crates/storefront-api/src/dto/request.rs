//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use storefront_entity::account::CustomerProfile;

/// Customer login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomerLoginRequest {
    /// Email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Admin login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminLoginRequest {
    /// Admin name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body carrying a refresh token (refresh and revoke).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Customer signup request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Password; strength is checked by the password policy.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Contact and delivery details.
    #[serde(flatten)]
    pub profile: CustomerProfile,
}

/// Signup confirmation request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfirmRequest {
    /// Confirmation token returned by signup.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Customer profile update request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Replacement profile fields.
    #[serde(flatten)]
    pub profile: CustomerProfile,
}

/// Admin password change request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAdminPasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}
