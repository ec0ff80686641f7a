//! Request handlers grouped by resource.

pub mod admins;
pub mod customers;
pub mod health;
pub mod update;
pub mod ws;
