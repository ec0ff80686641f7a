//! Top-level real-time engine.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use storefront_auth::session::SessionManager;
use storefront_core::config::RealtimeConfig;
use storefront_database::repositories::ConnectionRepository;

use crate::connection::authenticator::WsAuthenticator;
use crate::connection::manager::ConnectionManager;

/// Central real-time engine shared by the HTTP layer and in-process publishers.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new engine.
    ///
    /// `records` enables mirroring of connection state into the store.
    pub fn new(
        config: RealtimeConfig,
        sessions: SessionManager,
        records: Option<ConnectionRepository>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let records = records.filter(|_| config.persist_connections);
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            WsAuthenticator::new(sessions),
            records,
        ));

        info!(prefix = %config.resource_path_prefix, "Real-time engine initialized");

        Self {
            connections,
            config,
            shutdown_tx,
        }
    }

    /// Clears connection records a previous process left behind.
    pub async fn start(&self) {
        self.connections.purge_stale_records().await;
    }

    /// Fans a resource update out to its subscribers.
    pub async fn publish_update(&self, resource_id: &str, payload: serde_json::Value) -> usize {
        self.connections.publish_update(resource_id, payload).await
    }

    /// Whether `key` matches the configured update hook key.
    pub fn accepts_update_key(&self, key: &str) -> bool {
        !self.config.update_key.is_empty() && key == self.config.update_key
    }

    /// Returns a shutdown receiver; socket tasks stop when it fires.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals all socket tasks to stop and closes every connection.
    pub async fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all().await;
        info!("Real-time engine shut down");
    }
}
