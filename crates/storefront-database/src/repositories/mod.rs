//! Typed repositories over the document store.

pub mod account;
pub mod connection;
pub mod pending;

pub use account::AccountRepository;
pub use connection::ConnectionRepository;
pub use pending::PendingCustomerRepository;
