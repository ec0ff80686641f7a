//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod json;

pub use auth::{AdminAuth, CustomerAuth, access_token};
pub use client::ClientIp;
pub use json::ValidJson;
