//! Connection manager: connection lifecycle, client events and update fan-out.
//!
//! Broadcast scope is path-scoped: an update for resource `R` reaches only
//! connections whose current subscription target is `R`, authenticated or
//! not.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use storefront_core::config::RealtimeConfig;
use storefront_core::error::AppError;
use storefront_database::repositories::ConnectionRepository;
use storefront_entity::connection::SubscriptionTarget;

use crate::message::types::{InboundMessage, OutboundMessage};

use super::authenticator::WsAuthenticator;
use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: Arc<ConnectionPool>,
    authenticator: WsAuthenticator,
    /// Mirrors connection state into the document store when set.
    records: Option<ConnectionRepository>,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        authenticator: WsAuthenticator,
        records: Option<ConnectionRepository>,
    ) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            authenticator,
            records,
            config,
        }
    }

    /// Registers a new anonymous connection opened at `url`.
    ///
    /// Fails with `Validation` when the handshake carries no url. Returns the
    /// handle and a receiver of serialized outbound events.
    pub async fn register(
        &self,
        url: Option<&str>,
        ip: Option<String>,
    ) -> Result<(Arc<ConnectionHandle>, mpsc::Receiver<String>), AppError> {
        let url = url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::validation("Wrong params"))?;

        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let target = self.parse_target(url);
        let handle = Arc::new(ConnectionHandle::new(ip, url.to_string(), target.clone(), tx));

        self.pool.add(Arc::clone(&handle));
        self.persist(&handle).await;

        info!(
            conn_id = %handle.id,
            path = %url,
            target = ?target.as_ref().map(|t| t.resource_id.as_str()),
            "WebSocket connection registered"
        );

        Ok((handle, rx))
    }

    /// Unregisters a connection and deletes its record.
    pub async fn unregister(&self, conn_id: &str) {
        let Some(handle) = self.pool.remove(conn_id) else {
            return;
        };
        handle.mark_closed();

        if let Some(records) = &self.records {
            if let Err(e) = records.delete(conn_id).await {
                warn!(conn_id = %conn_id, error = %e, "Failed to delete connection record");
            }
        }

        info!(conn_id = %conn_id, "WebSocket connection unregistered");
    }

    /// Processes a raw client event.
    ///
    /// Never fails the socket: unparsable events get an `error` reply and
    /// unverifiable tokens leave the connection anonymous.
    pub async fn handle_inbound(&self, conn_id: &str, raw_message: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        let msg: InboundMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                let reply = OutboundMessage::error(
                    "INVALID_MESSAGE",
                    format!("Failed to parse message: {e}"),
                );
                send_event(&handle, &reply);
                return;
            }
        };

        match msg {
            InboundMessage::Authenticated { token } => {
                match self.authenticator.identify(&token) {
                    Some(identity) => {
                        debug!(
                            conn_id = %conn_id,
                            identity = %identity.identity,
                            role = %identity.role,
                            "Connection authenticated"
                        );
                        handle.set_identity(identity).await;
                    }
                    None => {
                        debug!(conn_id = %conn_id, "Unverifiable token, connection stays anonymous");
                        return;
                    }
                }
            }
            InboundMessage::Routing { url } => {
                let target = self.parse_target(&url);
                debug!(
                    conn_id = %conn_id,
                    path = %url,
                    target = ?target.as_ref().map(|t| t.resource_id.as_str()),
                    "Connection routed"
                );
                handle.route(url, target).await;
            }
        }

        self.persist(&handle).await;
    }

    /// Sends an `update` event to every connection watching `resource_id`.
    ///
    /// Returns the number of connections the event was queued for.
    pub async fn publish_update(&self, resource_id: &str, payload: serde_json::Value) -> usize {
        let event = OutboundMessage::Update {
            resource_id: resource_id.to_string(),
            payload,
        };
        let msg = match serde_json::to_string(&event) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "Failed to serialize update event");
                return 0;
            }
        };

        let mut sent = 0;
        for conn in self.pool.all_connections() {
            if conn.is_subscribed_to(resource_id).await && conn.send(msg.clone()) {
                sent += 1;
            }
        }

        debug!(resource_id = %resource_id, sent, "Update published");
        sent
    }

    /// Closes all connections.
    pub async fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.mark_closed();
            self.unregister(&conn.id).await;
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Removes connection records left behind by a previous process.
    pub async fn purge_stale_records(&self) {
        let Some(records) = &self.records else {
            return;
        };
        match records.clear().await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "Removed stale connection records"),
            Err(e) => warn!(error = %e, "Failed to clear stale connection records"),
        }
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Looks up a live connection.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.pool.get(conn_id)
    }

    fn parse_target(&self, url: &str) -> Option<SubscriptionTarget> {
        SubscriptionTarget::parse(url, &self.config.resource_path_prefix)
    }

    /// Best-effort mirror of the handle into the store.
    ///
    /// Closed handles are never written. A handle closed while the write is
    /// in flight has its record removed again.
    async fn persist(&self, handle: &ConnectionHandle) {
        let Some(records) = &self.records else {
            return;
        };
        if !handle.is_alive() {
            return;
        }
        if let Err(e) = records.upsert(&handle.record().await).await {
            warn!(conn_id = %handle.id, error = %e, "Failed to persist connection record");
            return;
        }
        if !handle.is_alive() {
            if let Err(e) = records.delete(&handle.id).await {
                warn!(conn_id = %handle.id, error = %e, "Failed to delete connection record");
            }
        }
    }
}

fn send_event(handle: &ConnectionHandle, event: &OutboundMessage) {
    match serde_json::to_string(event) {
        Ok(msg) => {
            handle.send(msg);
        }
        Err(e) => error!(error = %e, "Failed to serialize outbound message"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storefront_auth::password::PasswordHasher;
    use storefront_auth::session::SessionManager;
    use storefront_auth::token::TokenCodec;
    use storefront_core::config::{AuthConfig, SessionConfig};
    use storefront_core::error::ErrorKind;
    use storefront_core::traits::DocumentStore;
    use storefront_database::MemoryDocumentStore;
    use storefront_database::repositories::AccountRepository;
    use storefront_entity::account::{Account, AccountProfile, AccountRole, CustomerProfile};

    struct Fixture {
        manager: ConnectionManager,
        sessions: SessionManager,
        records: ConnectionRepository,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let accounts = AccountRepository::new(Arc::clone(&store));
        let hasher = Arc::new(PasswordHasher::new());
        accounts
            .create(&Account::new(
                "a@x.com",
                hasher.hash_password("p").unwrap(),
                AccountProfile::Customer(CustomerProfile::default()),
            ))
            .await
            .unwrap();

        let auth = AuthConfig::default();
        let sessions = SessionManager::new(
            Arc::new(TokenCodec::from_config(&auth).unwrap()),
            accounts,
            hasher,
            auth,
            SessionConfig::default(),
        );
        let records = ConnectionRepository::new(store);
        let manager = ConnectionManager::new(
            RealtimeConfig::default(),
            WsAuthenticator::new(sessions.clone()),
            Some(records.clone()),
        );
        Fixture {
            manager,
            sessions,
            records,
        }
    }

    #[tokio::test]
    async fn test_update_reaches_only_matching_subscribers() {
        let f = fixture().await;
        let (_watcher, mut watcher_rx) = f.manager.register(Some("/products/42"), None).await.unwrap();
        let (_other, mut other_rx) = f.manager.register(Some("/products/7"), None).await.unwrap();
        let (_home, mut home_rx) = f.manager.register(Some("/"), None).await.unwrap();

        let sent = f.manager.publish_update("42", json!({"id": "42", "stock": 3})).await;
        assert_eq!(sent, 1);

        let msg: serde_json::Value = serde_json::from_str(&watcher_rx.try_recv().unwrap()).unwrap();
        assert_eq!(msg["type"], "update");
        assert_eq!(msg["resource_id"], "42");
        assert_eq!(msg["payload"]["stock"], 3);
        assert!(other_rx.try_recv().is_err());
        assert!(home_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_routing_replaces_target() {
        let f = fixture().await;
        let (handle, mut rx) = f.manager.register(Some("/products/7"), None).await.unwrap();

        f.manager
            .handle_inbound(&handle.id, r#"{"type":"routing","url":"/products/42"}"#)
            .await;
        assert_eq!(f.manager.publish_update("7", json!({})).await, 0);
        assert_eq!(f.manager.publish_update("42", json!({})).await, 1);
        assert!(rx.try_recv().is_ok());

        f.manager
            .handle_inbound(&handle.id, r#"{"type":"routing","url":"/cart"}"#)
            .await;
        assert!(handle.target().await.is_none());
        assert_eq!(f.manager.publish_update("42", json!({})).await, 0);

        let record = f.records.find_by_id(&handle.id).await.unwrap().unwrap();
        assert_eq!(record.path, "/cart");
        assert!(record.target.is_none());
    }

    #[tokio::test]
    async fn test_authenticated_event_sets_identity() {
        let f = fixture().await;
        let (handle, _rx) = f.manager.register(Some("/"), None).await.unwrap();

        let login = f
            .sessions
            .login(AccountRole::Customer, "a@x.com", "p")
            .await
            .unwrap();
        let event = json!({"type": "authenticated", "token": login.access_token}).to_string();
        f.manager.handle_inbound(&handle.id, &event).await;

        let identity = handle.identity().await.unwrap();
        assert_eq!(identity.identity, "a@x.com");
        assert_eq!(identity.role, AccountRole::Customer);

        let record = f.records.find_by_id(&handle.id).await.unwrap().unwrap();
        assert_eq!(record.identity, Some(identity));
    }

    #[tokio::test]
    async fn test_bad_token_leaves_connection_anonymous() {
        let f = fixture().await;
        let (handle, mut rx) = f.manager.register(Some("/"), None).await.unwrap();

        f.manager
            .handle_inbound(&handle.id, r#"{"type":"authenticated","token":"forged"}"#)
            .await;
        assert!(handle.identity().await.is_none());
        assert!(handle.is_alive());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_event_gets_error_reply() {
        let f = fixture().await;
        let (handle, mut rx) = f.manager.register(Some("/"), None).await.unwrap();

        f.manager.handle_inbound(&handle.id, "{not json").await;
        let msg: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(msg["type"], "error");
        assert_eq!(msg["code"], "INVALID_MESSAGE");
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn test_missing_url_is_rejected() {
        let f = fixture().await;
        let err = f.manager.register(None, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = f.manager.register(Some("  "), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(f.manager.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_unregister_deletes_record() {
        let f = fixture().await;
        let (handle, _rx) = f
            .manager
            .register(Some("/products/1"), Some("10.0.0.1".to_string()))
            .await
            .unwrap();
        let record = f.records.find_by_id(&handle.id).await.unwrap().unwrap();
        assert_eq!(record.ip.as_deref(), Some("10.0.0.1"));

        f.manager.unregister(&handle.id).await;
        assert!(f.records.find_by_id(&handle.id).await.unwrap().is_none());
        assert_eq!(f.manager.connection_count(), 0);
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn test_close_all() {
        let f = fixture().await;
        f.manager.register(Some("/products/1"), None).await.unwrap();
        f.manager.register(Some("/products/2"), None).await.unwrap();
        f.manager.close_all().await;
        assert_eq!(f.manager.connection_count(), 0);
        assert!(f.records.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_connection_is_not_persisted() {
        let f = fixture().await;
        let (handle, _rx) = f.manager.register(Some("/products/1"), None).await.unwrap();

        // Shutdown marks the handle closed before its record is dropped.
        handle.mark_closed();
        f.records.delete(&handle.id).await.unwrap();

        f.manager
            .handle_inbound(&handle.id, r#"{"type":"routing","url":"/products/2"}"#)
            .await;
        assert!(f.records.find_by_id(&handle.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_buffer_still_registers() {
        let mut f = fixture().await;
        f.manager.config.channel_buffer_size = 0;
        let (handle, mut rx) = f.manager.register(Some("/products/9"), None).await.unwrap();
        assert_eq!(f.manager.publish_update("9", json!({})).await, 1);
        assert!(rx.try_recv().is_ok());
        assert!(handle.is_alive());
    }
}
