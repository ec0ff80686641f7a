//! Live connection record repository.

use std::sync::Arc;

use storefront_core::error::AppError;
use storefront_core::result::AppResult;
use storefront_core::traits::{DocumentStore, DocumentStoreExt};
use storefront_entity::connection::ConnectionRecord;

/// Repository mirroring live websocket connections into the store.
#[derive(Debug, Clone)]
pub struct ConnectionRepository {
    store: Arc<dyn DocumentStore>,
}

impl ConnectionRepository {
    /// Create a new connection repository.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert or replace a connection record.
    pub async fn upsert(&self, record: &ConnectionRecord) -> AppResult<()> {
        self.store
            .put_typed(ConnectionRecord::COLLECTION, &record.id, record)
            .await
    }

    /// Find a connection record by id.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<ConnectionRecord>> {
        self.store.get_typed(ConnectionRecord::COLLECTION, id).await
    }

    /// Delete a connection record.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        self.store.delete(ConnectionRecord::COLLECTION, id).await
    }

    /// List every stored connection record.
    pub async fn list(&self) -> AppResult<Vec<ConnectionRecord>> {
        self.store
            .list(ConnectionRecord::COLLECTION)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }

    /// Remove every record, e.g. ones left over from an unclean shutdown.
    pub async fn clear(&self) -> AppResult<u64> {
        let mut removed = 0;
        for record in self.list().await? {
            if self.delete(&record.id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
