//! # storefront-core
//!
//! Core crate for Storefront. Contains configuration schemas, the
//! document-store contract, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Storefront crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
