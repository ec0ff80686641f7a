//! Connection record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::target::SubscriptionTarget;
use crate::account::AccountRole;

/// Identity attached to a connection after a successful `authenticated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionIdentity {
    /// Account identity key.
    pub identity: String,
    /// Account role.
    pub role: AccountRole,
}

/// One document per live socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    /// Connection id; also the document id.
    pub id: String,
    /// Remote address, when known.
    pub ip: Option<String>,
    /// Authenticated identity, `None` while anonymous.
    pub identity: Option<ConnectionIdentity>,
    /// Last path reported by the client.
    pub path: String,
    /// Current subscription target.
    pub target: Option<SubscriptionTarget>,
    /// When the socket connected.
    pub connected_at: DateTime<Utc>,
}

impl ConnectionRecord {
    /// Document store collection for connection records.
    pub const COLLECTION: &'static str = "connections";
}
