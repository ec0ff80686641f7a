//! Live websocket connection records and subscription targets.

pub mod model;
pub mod target;

pub use model::{ConnectionIdentity, ConnectionRecord};
pub use target::SubscriptionTarget;
