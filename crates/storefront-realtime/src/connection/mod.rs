//! WebSocket connection management: handles, pool, authentication, lifecycle.

pub mod authenticator;
pub mod handle;
pub mod manager;
pub mod pool;

pub use authenticator::WsAuthenticator;
pub use handle::{ConnectionHandle, ConnectionId};
pub use manager::ConnectionManager;
pub use pool::ConnectionPool;
