//! Account management beyond the session flow.

pub mod manager;

pub use manager::AccountManager;
