//! Pending customer signup model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::CustomerProfile;

/// A signup awaiting confirmation. The store expires it after a fixed TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCustomer {
    /// Confirmation token; also the document id.
    pub token: String,
    /// Email the customer signed up with.
    pub email: String,
    /// Argon2 hash of the chosen password.
    pub password_hash: String,
    /// Profile submitted with the signup.
    #[serde(default)]
    pub profile: CustomerProfile,
    /// When the signup was submitted.
    pub created_at: DateTime<Utc>,
}

impl PendingCustomer {
    /// Document store collection for pending signups.
    pub const COLLECTION: &'static str = "pending_customers";
    /// Document field holding the email.
    pub const EMAIL_FIELD: &'static str = "email";
}
