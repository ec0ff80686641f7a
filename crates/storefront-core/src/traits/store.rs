//! Document store trait for pluggable persistence backends.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;

/// A stored document: a JSON object keyed by `(collection, id)`.
pub type Document = serde_json::Value;

/// Trait for document store backends (in-memory, PostgreSQL).
///
/// Every mutating operation is atomic for a single record. Callers never
/// hold locks across calls; concurrent list pushes on one record must all
/// land.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a document by its id. Expired documents are treated as absent.
    async fn find_by_id(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;

    /// Find the first document whose top-level string `field` equals `value`.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> AppResult<Option<Document>>;

    /// Insert or fully replace a document.
    async fn upsert(&self, collection: &str, id: &str, doc: Document) -> AppResult<()>;

    /// Insert a document that auto-expires after `ttl`, only if `id` is free.
    ///
    /// Returns `false` when a live document already holds the id.
    async fn insert_with_ttl(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        ttl: Duration,
    ) -> AppResult<bool>;

    /// Insert a permanent document unless the id is taken or a live document
    /// already carries the same string value in `unique_field`.
    ///
    /// The check and the insert are one atomic step. Returns `false` on a
    /// conflict.
    async fn insert_unique(
        &self,
        collection: &str,
        id: &str,
        unique_field: &str,
        doc: Document,
    ) -> AppResult<bool>;

    /// Append `value` to the array `field`. Returns `false` if the document is missing.
    async fn push_to_list(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> AppResult<bool>;

    /// Remove every occurrence of `value` from the array `field`.
    ///
    /// Returns `true` if at least one element was removed.
    async fn pull_from_list(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> AppResult<bool>;

    /// Set a single top-level field. Returns `false` if the document is missing.
    async fn set_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Document,
    ) -> AppResult<bool>;

    /// Delete a document. Returns `true` if it existed.
    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool>;

    /// List every live document in a collection.
    async fn list(&self, collection: &str) -> AppResult<Vec<Document>>;

    /// Remove expired documents from every collection. Returns the number removed.
    async fn purge_expired(&self) -> AppResult<u64>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Typed helpers layered on top of [`DocumentStore`].
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Find and deserialize a document by id.
    async fn get_typed<T: DeserializeOwned + Send>(
        &self,
        collection: &str,
        id: &str,
    ) -> AppResult<Option<T>> {
        match self.find_by_id(collection, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Find and deserialize a document by a string field.
    async fn find_typed<T: DeserializeOwned + Send>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> AppResult<Option<T>> {
        match self.find_by_field(collection, field, value).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Serialize and upsert a document.
    async fn put_typed<T: Serialize + Send + Sync>(
        &self,
        collection: &str,
        id: &str,
        value: &T,
    ) -> AppResult<()> {
        let doc = serde_json::to_value(value)?;
        self.upsert(collection, id, doc).await
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}
