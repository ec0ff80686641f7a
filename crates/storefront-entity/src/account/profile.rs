//! Role-specific profile fields.

use serde::{Deserialize, Serialize};

use super::role::{AccountRole, AdminAccess};

/// Customer contact and delivery details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerProfile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Street name.
    pub street: String,
    /// House number.
    pub house_number: String,
    /// Postal code.
    pub postal_code: String,
    /// City.
    pub city: String,
    /// Country.
    pub country: String,
}

/// Admin back-office settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    /// Access level embedded into admin access tokens.
    #[serde(default)]
    pub access: AdminAccess,
}

/// Profile payload, discriminated by account role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AccountProfile {
    /// Customer fields.
    Customer(CustomerProfile),
    /// Admin fields.
    Admin(AdminProfile),
}

impl AccountProfile {
    /// The role this profile belongs to.
    pub fn role(&self) -> AccountRole {
        match self {
            Self::Customer(_) => AccountRole::Customer,
            Self::Admin(_) => AccountRole::Admin,
        }
    }

    /// Admin access level, if this is an admin profile.
    pub fn admin_access(&self) -> Option<AdminAccess> {
        match self {
            Self::Admin(admin) => Some(admin.access),
            Self::Customer(_) => None,
        }
    }
}
