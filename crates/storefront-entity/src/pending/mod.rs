//! Pending customer signups.

pub mod model;

pub use model::PendingCustomer;
