//! # storefront-entity
//!
//! Domain entities persisted in the document store: accounts (customers
//! and admins), pending customer signups, and live connection records.

pub mod account;
pub mod connection;
pub mod pending;

pub use account::{Account, AccountProfile, AccountRole, AdminAccess, PublicAccount};
pub use connection::{ConnectionIdentity, ConnectionRecord, SubscriptionTarget};
pub use pending::PendingCustomer;
