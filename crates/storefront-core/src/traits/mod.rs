//! Core traits implemented by infrastructure crates.

pub mod store;

pub use store::{Document, DocumentStore, DocumentStoreExt};
