//! In-memory document store backed by sharded `DashMap`s.
//!
//! Each mutation holds the shard lock of a single record only, which gives
//! the per-record atomicity the session scheme relies on.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use tracing::debug;

use storefront_core::error::AppError;
use storefront_core::result::AppResult;
use storefront_core::traits::{Document, DocumentStore};

#[derive(Debug, Clone)]
struct StoredDocument {
    body: Document,
    expires_at: Option<Instant>,
}

impl StoredDocument {
    fn permanent(body: Document) -> Self {
        Self {
            body,
            expires_at: None,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

type Collection = DashMap<String, StoredDocument>;

/// In-process document store. Contents are lost on restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryDocumentStore {
    collections: Arc<DashMap<String, Arc<Collection>>>,
    /// Serializes `insert_unique` calls; held across the scan and the insert.
    unique_writes: Arc<Mutex<()>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, name: &str) -> Arc<Collection> {
        if let Some(existing) = self.collections.get(name) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.collections
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(DashMap::new()))
                .value(),
        )
    }

    /// Applies `mutate` to the array `field` of a live document.
    ///
    /// Returns `None` if the document is missing or expired.
    fn with_list<R>(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        mutate: impl FnOnce(&mut Vec<Value>) -> R,
    ) -> AppResult<Option<R>> {
        let coll = self.collection(collection);
        let Some(mut entry) = coll.get_mut(id) else {
            return Ok(None);
        };
        if !entry.is_live(Instant::now()) {
            return Ok(None);
        }

        let object = entry
            .body
            .as_object_mut()
            .ok_or_else(|| AppError::database(format!("Document {collection}/{id} is not an object")))?;

        let slot = object
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        let list = slot.as_array_mut().ok_or_else(|| {
            AppError::validation(format!("Field '{field}' of {collection}/{id} is not a list"))
        })?;

        Ok(Some(mutate(list)))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_by_id(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let coll = self.collection(collection);
        let now = Instant::now();
        Ok(coll
            .get(id)
            .filter(|doc| doc.is_live(now))
            .map(|doc| doc.body.clone()))
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> AppResult<Option<Document>> {
        let coll = self.collection(collection);
        let now = Instant::now();
        Ok(coll
            .iter()
            .filter(|entry| entry.is_live(now))
            .find(|entry| entry.body.get(field).and_then(Value::as_str) == Some(value))
            .map(|entry| entry.body.clone()))
    }

    async fn upsert(&self, collection: &str, id: &str, doc: Document) -> AppResult<()> {
        self.collection(collection)
            .insert(id.to_string(), StoredDocument::permanent(doc));
        Ok(())
    }

    async fn insert_with_ttl(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        ttl: Duration,
    ) -> AppResult<bool> {
        let coll = self.collection(collection);
        let now = Instant::now();
        let stored = StoredDocument {
            body: doc,
            expires_at: Some(now + ttl),
        };

        match coll.entry(id.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return Ok(false);
                }
                occupied.insert(stored);
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(stored);
                Ok(true)
            }
        }
    }

    async fn insert_unique(
        &self,
        collection: &str,
        id: &str,
        unique_field: &str,
        doc: Document,
    ) -> AppResult<bool> {
        let Some(key) = doc.get(unique_field).and_then(Value::as_str).map(str::to_string) else {
            return Err(AppError::validation(format!(
                "Field '{unique_field}' of {collection}/{id} must be a string"
            )));
        };

        let coll = self.collection(collection);
        let _guard = self
            .unique_writes
            .lock()
            .map_err(|_| AppError::internal("Unique insert lock poisoned"))?;

        let now = Instant::now();
        let taken = coll.iter().any(|entry| {
            entry.is_live(now)
                && (entry.key().as_str() == id
                    || entry.body.get(unique_field).and_then(Value::as_str) == Some(key.as_str()))
        });
        if taken {
            return Ok(false);
        }
        coll.insert(id.to_string(), StoredDocument::permanent(doc));
        Ok(true)
    }

    async fn push_to_list(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> AppResult<bool> {
        let pushed = self.with_list(collection, id, field, |list| {
            list.push(Value::String(value.to_string()));
        })?;
        Ok(pushed.is_some())
    }

    async fn pull_from_list(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> AppResult<bool> {
        let removed = self.with_list(collection, id, field, |list| {
            let before = list.len();
            list.retain(|item| item.as_str() != Some(value));
            list.len() < before
        })?;
        Ok(removed.unwrap_or(false))
    }

    async fn set_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Document,
    ) -> AppResult<bool> {
        let coll = self.collection(collection);
        let Some(mut entry) = coll.get_mut(id) else {
            return Ok(false);
        };
        if !entry.is_live(Instant::now()) {
            return Ok(false);
        }
        let object = entry
            .body
            .as_object_mut()
            .ok_or_else(|| AppError::database(format!("Document {collection}/{id} is not an object")))?;
        object.insert(field.to_string(), value);
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool> {
        let now = Instant::now();
        Ok(self
            .collection(collection)
            .remove(id)
            .is_some_and(|(_, doc)| doc.is_live(now)))
    }

    async fn list(&self, collection: &str) -> AppResult<Vec<Document>> {
        let now = Instant::now();
        Ok(self
            .collection(collection)
            .iter()
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.body.clone())
            .collect())
    }

    async fn purge_expired(&self) -> AppResult<u64> {
        let now = Instant::now();
        let mut removed = 0u64;
        for coll in self.collections.iter() {
            let before = coll.len();
            coll.retain(|_, doc| doc.is_live(now));
            removed += (before - coll.len()) as u64;
        }
        if removed > 0 {
            debug!(removed, "Purged expired documents");
        }
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
