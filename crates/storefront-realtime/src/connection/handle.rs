//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use storefront_entity::connection::{ConnectionIdentity, ConnectionRecord, SubscriptionTarget};

/// Unique connection identifier.
pub type ConnectionId = String;

/// A handle to a single WebSocket connection.
///
/// Holds the sender for pushing serialized events to the client, plus the
/// connection's identity and subscription state.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Remote address, when known.
    pub ip: Option<String>,
    /// Sender for outbound messages.
    sender: mpsc::Sender<String>,
    /// Authenticated identity; `None` while anonymous.
    identity: RwLock<Option<ConnectionIdentity>>,
    /// Last reported client path.
    path: RwLock<String>,
    /// Resource this connection watches.
    target: RwLock<Option<SubscriptionTarget>>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Creates an anonymous handle for a new socket.
    pub fn new(
        ip: Option<String>,
        path: String,
        target: Option<SubscriptionTarget>,
        sender: mpsc::Sender<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ip,
            sender,
            identity: RwLock::new(None),
            path: RwLock::new(path),
            target: RwLock::new(target),
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queues a serialized event for the client.
    ///
    /// Returns `false` if the buffer is full or the socket has gone.
    pub fn send(&self, msg: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection closed; later sends are dropped.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Sets the authenticated identity.
    pub async fn set_identity(&self, identity: ConnectionIdentity) {
        *self.identity.write().await = Some(identity);
    }

    /// Current identity, if authenticated.
    pub async fn identity(&self) -> Option<ConnectionIdentity> {
        self.identity.read().await.clone()
    }

    /// Replaces the client path and its subscription target.
    pub async fn route(&self, path: String, target: Option<SubscriptionTarget>) {
        *self.path.write().await = path;
        *self.target.write().await = target;
    }

    /// Current subscription target.
    pub async fn target(&self) -> Option<SubscriptionTarget> {
        self.target.read().await.clone()
    }

    /// Whether this connection watches `resource_id`.
    pub async fn is_subscribed_to(&self, resource_id: &str) -> bool {
        self.target
            .read()
            .await
            .as_ref()
            .is_some_and(|target| target.matches(resource_id))
    }

    /// Snapshot for persistence.
    pub async fn record(&self) -> ConnectionRecord {
        ConnectionRecord {
            id: self.id.clone(),
            ip: self.ip.clone(),
            identity: self.identity.read().await.clone(),
            path: self.path.read().await.clone(),
            target: self.target.read().await.clone(),
            connected_at: self.connected_at,
        }
    }
}
