//! Encrypted session tokens: codec and claims.

pub mod claims;
pub mod codec;

pub use claims::{AccessClaims, Claims, RefreshClaims};
pub use codec::{TokenCodec, TokenError};
