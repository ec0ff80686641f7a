//! Symmetric token codec.
//!
//! Tokens are `base64url(nonce || ciphertext)` where the ciphertext is the
//! ChaCha20-Poly1305 seal of the JSON-serialized claims. A fresh random nonce
//! is drawn for every call, so identical claims never encrypt to the same
//! string. Any modification of the token fails authentication on decrypt.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use serde::Serialize;
use serde::de::DeserializeOwned;

use storefront_core::config::AuthConfig;
use storefront_core::error::{AppError, ErrorKind};

const NONCE_LEN: usize = 12;

/// Failures while sealing or opening a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The claims could not be serialized or sealed.
    #[error("token encryption failed")]
    EncryptionFailed,
    /// The token is not valid base64 or is too short to hold a nonce.
    #[error("invalid token encoding")]
    InvalidEncoding,
    /// Authentication tag mismatch: wrong key or tampered token.
    #[error("token decryption failed")]
    DecryptionFailed,
    /// Decrypted payload is not the expected claims shape.
    #[error("malformed token payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        let kind = match err {
            TokenError::EncryptionFailed => ErrorKind::Internal,
            _ => ErrorKind::Unauthorized,
        };
        AppError::with_source(kind, "Invalid or unusable token", err)
    }
}

/// Encrypts and decrypts opaque token strings with a process-wide key.
#[derive(Clone)]
pub struct TokenCodec {
    cipher: ChaCha20Poly1305,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec from a raw 256-bit key.
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(key.into()),
        }
    }

    /// Creates a codec from the auth configuration, validating the key length.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        Ok(Self::new(&config.key_bytes()?))
    }

    /// Serializes and seals `value` into an opaque token.
    pub fn encrypt<T: Serialize>(&self, value: &T) -> Result<String, TokenError> {
        let plaintext = serde_json::to_vec(value).map_err(|_| TokenError::EncryptionFailed)?;
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| TokenError::EncryptionFailed)?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(combined))
    }

    /// Opens a token and deserializes its payload.
    pub fn decrypt<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let combined = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| TokenError::InvalidEncoding)?;

        if combined.len() <= NONCE_LEN {
            return Err(TokenError::InvalidEncoding);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| TokenError::DecryptionFailed)?;

        Ok(serde_json::from_slice(&plaintext)?)
    }
}
