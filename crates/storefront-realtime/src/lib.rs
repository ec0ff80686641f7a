//! # storefront-realtime
//!
//! Live-update broadcaster for Storefront. Provides:
//!
//! - A registry of open websocket connections, each with an optional
//!   identity and an optional subscription target
//! - Soft authentication of sockets from access tokens
//! - Path-scoped fan-out of resource updates to subscribed sockets

pub mod connection;
pub mod message;
pub mod server;

pub use connection::manager::ConnectionManager;
pub use message::{InboundMessage, OutboundMessage};
pub use server::RealtimeEngine;
