//! Soft authentication of websocket connections.

use storefront_auth::session::SessionManager;
use storefront_entity::connection::ConnectionIdentity;

/// Resolves the identity behind an `authenticated` event.
///
/// Only decryption and the shared-secret tag are checked; an expired token
/// still identifies its holder. Failure leaves the socket anonymous.
#[derive(Debug, Clone)]
pub struct WsAuthenticator {
    sessions: SessionManager,
}

impl WsAuthenticator {
    /// Creates a new authenticator.
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    /// Returns the identity carried by `token`, if it was issued here.
    pub fn identify(&self, token: &str) -> Option<ConnectionIdentity> {
        self.sessions
            .verify_soft(token)
            .map(|verified| ConnectionIdentity {
                identity: verified.identity,
                role: verified.role,
            })
    }
}
