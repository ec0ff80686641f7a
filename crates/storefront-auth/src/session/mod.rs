//! Session lifecycle: login, refresh, verification and revocation.

pub mod keys;
pub mod manager;

pub use keys::generate_key;
pub use manager::{LoginResult, RefreshResult, SessionManager, VerifiedIdentity};
