//! Account role and admin access enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two kinds of account that can hold a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Storefront customer, identified by email.
    Customer,
    /// Back-office administrator, identified by name.
    Admin,
}

impl AccountRole {
    /// Document store collection holding accounts of this role.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Customer => "customers",
            Self::Admin => "admins",
        }
    }

    /// Human label of the identity key, used in error messages.
    pub fn identity_label(&self) -> &'static str {
        match self {
            Self::Customer => "email",
            Self::Admin => "name",
        }
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = storefront_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(storefront_core::AppError::validation(format!(
                "Invalid account role: '{s}'. Expected one of: customer, admin"
            ))),
        }
    }
}

/// Access level carried by admin accounts and their access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdminAccess {
    /// Full back-office access.
    #[default]
    Full,
    /// May edit catalogue content only.
    Editor,
}

impl AdminAccess {
    /// Return the access level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Editor => "editor",
        }
    }
}

impl fmt::Display for AdminAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdminAccess {
    type Err = storefront_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "editor" => Ok(Self::Editor),
            _ => Err(storefront_core::AppError::validation(format!(
                "Invalid admin access: '{s}'. Expected one of: full, editor"
            ))),
        }
    }
}
