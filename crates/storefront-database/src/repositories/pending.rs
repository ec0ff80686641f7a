//! Pending customer signup repository.

use std::sync::Arc;
use std::time::Duration;

use storefront_core::result::AppResult;
use storefront_core::traits::{DocumentStore, DocumentStoreExt};
use storefront_entity::pending::PendingCustomer;

/// Repository for signups awaiting confirmation.
#[derive(Debug, Clone)]
pub struct PendingCustomerRepository {
    store: Arc<dyn DocumentStore>,
}

impl PendingCustomerRepository {
    /// Create a new pending signup repository.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store a pending signup that expires after `ttl`.
    ///
    /// Returns `false` if the confirmation token is already in use.
    pub async fn create(&self, pending: &PendingCustomer, ttl: Duration) -> AppResult<bool> {
        let doc = serde_json::to_value(pending)?;
        self.store
            .insert_with_ttl(PendingCustomer::COLLECTION, &pending.token, doc, ttl)
            .await
    }

    /// Find a live pending signup by confirmation token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<PendingCustomer>> {
        self.store.get_typed(PendingCustomer::COLLECTION, token).await
    }

    /// Find a live pending signup by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<PendingCustomer>> {
        self.store
            .find_typed(PendingCustomer::COLLECTION, PendingCustomer::EMAIL_FIELD, email)
            .await
    }

    /// Remove a pending signup. Returns `true` if it was still live.
    pub async fn delete(&self, token: &str) -> AppResult<bool> {
        self.store.delete(PendingCustomer::COLLECTION, token).await
    }
}
