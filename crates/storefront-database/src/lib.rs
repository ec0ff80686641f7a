//! # storefront-database
//!
//! Document store backends (in-memory and PostgreSQL JSONB), pool setup
//! with schema migration, and typed repositories over the
//! [`DocumentStore`](storefront_core::traits::DocumentStore) contract.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod repositories;

use std::sync::Arc;

use tracing::info;

use storefront_core::config::{DatabaseConfig, StoreBackend};
use storefront_core::result::AppResult;
use storefront_core::traits::DocumentStore;

pub use memory::MemoryDocumentStore;
pub use postgres::PostgresDocumentStore;

/// Opens the configured document store backend.
///
/// The postgres backend connects and runs migrations before returning.
pub async fn open_store(config: &DatabaseConfig) -> AppResult<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = connection::connect_postgres(config).await?;
            Ok(Arc::new(PostgresDocumentStore::new(pool)))
        }
    }
}
