//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::AccountProfile;
use super::role::AccountRole;

/// A customer or admin account as stored in the document store.
///
/// `session_tokens` holds the keys of every outstanding refresh token.
/// Duplicates are allowed; one entry exists per login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Document id.
    pub id: String,
    /// Account role.
    pub role: AccountRole,
    /// Identity key: email for customers, name for admins.
    pub identity: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Outstanding refresh-token keys.
    #[serde(default)]
    pub session_tokens: Vec<String>,
    /// Role-specific profile fields.
    pub profile: AccountProfile,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Document field holding the identity key.
    pub const IDENTITY_FIELD: &'static str = "identity";
    /// Document field holding the refresh-key list.
    pub const SESSION_TOKENS_FIELD: &'static str = "sessionTokens";
    /// Document field holding the password hash.
    pub const PASSWORD_HASH_FIELD: &'static str = "passwordHash";
    /// Document field holding the profile.
    pub const PROFILE_FIELD: &'static str = "profile";

    /// Builds a new account with a fresh id and no sessions.
    pub fn new(identity: impl Into<String>, password_hash: String, profile: AccountProfile) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: profile.role(),
            identity: identity.into(),
            password_hash,
            session_tokens: Vec::new(),
            profile,
            created_at: Utc::now(),
        }
    }

    /// Whether a refresh key is still honoured for this account.
    pub fn has_session_key(&self, key: &str) -> bool {
        self.session_tokens.iter().any(|k| k == key)
    }

    /// Strips the credential fields for responses.
    pub fn to_public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id.clone(),
            role: self.role,
            identity: self.identity.clone(),
            profile: self.profile.clone(),
            created_at: self.created_at,
        }
    }
}

/// Account view returned to clients: no password hash, no session keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    /// Document id.
    pub id: String,
    /// Account role.
    pub role: AccountRole,
    /// Identity key.
    pub identity: String,
    /// Role-specific profile fields.
    pub profile: AccountProfile,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        account.to_public()
    }
}
