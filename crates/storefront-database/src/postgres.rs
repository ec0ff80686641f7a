//! PostgreSQL document store over a single JSONB `documents` table.
//!
//! Every mutation is one SQL statement, so list pushes and pulls are atomic
//! per record without explicit transactions.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use storefront_core::error::{AppError, ErrorKind};
use storefront_core::result::AppResult;
use storefront_core::traits::{Document, DocumentStore};

const LIVE: &str = "(expires_at IS NULL OR expires_at > NOW())";

/// Document store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Create a new store over an already migrated pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn find_by_id(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        sqlx::query_scalar::<_, serde_json::Value>(&format!(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2 AND {LIVE}"
        ))
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find document"))
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> AppResult<Option<Document>> {
        sqlx::query_scalar::<_, serde_json::Value>(&format!(
            "SELECT body FROM documents WHERE collection = $1 AND body->>$2 = $3 AND {LIVE} LIMIT 1"
        ))
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find document by field"))
    }

    async fn upsert(&self, collection: &str, id: &str, doc: Document) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO documents (collection, id, body, expires_at, updated_at) \
             VALUES ($1, $2, $3, NULL, NOW()) \
             ON CONFLICT (collection, id) DO UPDATE \
             SET body = EXCLUDED.body, expires_at = NULL, updated_at = NOW()",
        )
        .bind(collection)
        .bind(id)
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                AppError::with_source(
                    ErrorKind::Validation,
                    format!("A document in '{collection}' already holds this identity"),
                    e,
                )
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to upsert document", e)
            }
        })?;
        Ok(())
    }

    async fn insert_with_ttl(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        ttl: Duration,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO documents (collection, id, body, expires_at, updated_at) \
             VALUES ($1, $2, $3, NOW() + make_interval(secs => $4), NOW()) \
             ON CONFLICT (collection, id) DO UPDATE \
             SET body = EXCLUDED.body, expires_at = EXCLUDED.expires_at, updated_at = NOW() \
             WHERE documents.expires_at IS NOT NULL AND documents.expires_at <= NOW()",
        )
        .bind(collection)
        .bind(id)
        .bind(doc)
        .bind(ttl.as_secs_f64())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to insert expiring document"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_unique(
        &self,
        collection: &str,
        id: &str,
        unique_field: &str,
        doc: Document,
    ) -> AppResult<bool> {
        // Account identities are also guarded by idx_documents_identity,
        // which turns a lost race into a skipped insert.
        let result = sqlx::query(&format!(
            "INSERT INTO documents (collection, id, body, expires_at, updated_at) \
             SELECT $1, $2, $4, NULL, NOW() \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM documents \
                 WHERE collection = $1 AND body->>$3 = $4->>$3 AND {LIVE}) \
             ON CONFLICT DO NOTHING"
        ))
        .bind(collection)
        .bind(id)
        .bind(unique_field)
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to insert unique document"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn push_to_list(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "UPDATE documents \
             SET body = jsonb_set(body, ARRAY[$3::text], \
                 COALESCE(NULLIF(body->$3, 'null'::jsonb), '[]'::jsonb) || jsonb_build_array($4::text)), \
                 updated_at = NOW() \
             WHERE collection = $1 AND id = $2 AND {LIVE}"
        ))
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to push list element"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn pull_from_list(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "UPDATE documents \
             SET body = jsonb_set(body, ARRAY[$3::text], COALESCE(( \
                 SELECT jsonb_agg(elem) FROM jsonb_array_elements(body->$3) AS elem \
                 WHERE elem <> to_jsonb($4::text)), '[]'::jsonb)), \
                 updated_at = NOW() \
             WHERE collection = $1 AND id = $2 AND {LIVE} \
               AND body->$3 @> jsonb_build_array($4::text)"
        ))
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to pull list element"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Document,
    ) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "UPDATE documents SET body = jsonb_set(body, ARRAY[$3::text], $4, true), updated_at = NOW() \
             WHERE collection = $1 AND id = $2 AND {LIVE}"
        ))
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to set document field"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM documents WHERE collection = $1 AND id = $2 AND {LIVE}"
        ))
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to delete document"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: &str) -> AppResult<Vec<Document>> {
        sqlx::query_scalar::<_, serde_json::Value>(&format!(
            "SELECT body FROM documents WHERE collection = $1 AND {LIVE} ORDER BY updated_at"
        ))
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list documents"))
    }

    async fn purge_expired(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM documents WHERE expires_at IS NOT NULL AND expires_at <= NOW()",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to purge expired documents"))?;
        let removed = result.rows_affected();
        if removed > 0 {
            debug!(removed, "Purged expired documents");
        }
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(db_err("Database health check failed"))
    }
}
