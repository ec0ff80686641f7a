//! # storefront-api
//!
//! HTTP API layer for Storefront built on Axum.
//!
//! Provides the customer and admin session endpoints, account endpoints,
//! the websocket upgrade, the update hook, middleware (CORS, logging),
//! extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
