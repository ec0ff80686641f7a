//! # storefront-auth
//!
//! Authentication and session management for Storefront.
//!
//! ## Modules
//!
//! - `token`: encrypted access/refresh tokens and their claims
//! - `password`: Argon2id password hashing and policy enforcement
//! - `session`: login, refresh, verification and revocation
//! - `account`: signup confirmation, profile and credential changes

pub mod account;
pub mod password;
pub mod session;
pub mod token;

pub use account::AccountManager;
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{LoginResult, RefreshResult, SessionManager, VerifiedIdentity};
pub use token::{AccessClaims, Claims, RefreshClaims, TokenCodec, TokenError};
