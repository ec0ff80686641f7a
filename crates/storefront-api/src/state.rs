//! Shared application state injected into all handlers.

use std::sync::Arc;

use storefront_auth::{
    AccountManager, PasswordHasher, PasswordValidator, SessionManager, TokenCodec,
};
use storefront_core::config::AppConfig;
use storefront_core::error::AppError;
use storefront_core::traits::DocumentStore;
use storefront_database::repositories::{
    AccountRepository, ConnectionRepository, PendingCustomerRepository,
};
use storefront_realtime::RealtimeEngine;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Document store backend.
    pub store: Arc<dyn DocumentStore>,
    /// Session flows for both roles.
    pub sessions: SessionManager,
    /// Signup and account maintenance.
    pub accounts: AccountManager,
    /// Real-time WebSocket engine.
    pub realtime: RealtimeEngine,
}

impl AppState {
    /// Wires repositories, the auth system and the real-time engine over `store`.
    ///
    /// Rejects configurations that fail [`AppConfig::validate`].
    pub fn build(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, AppError> {
        config.validate()?;

        let account_repo = AccountRepository::new(Arc::clone(&store));
        let pending_repo = PendingCustomerRepository::new(Arc::clone(&store));
        let connection_repo = ConnectionRepository::new(Arc::clone(&store));

        let codec = Arc::new(TokenCodec::from_config(&config.auth)?);
        let hasher = Arc::new(PasswordHasher::new());
        let validator = PasswordValidator::new(&config.auth);

        let sessions = SessionManager::new(
            codec,
            account_repo.clone(),
            Arc::clone(&hasher),
            config.auth.clone(),
            config.session.clone(),
        );
        let accounts = AccountManager::new(
            account_repo,
            pending_repo,
            sessions.clone(),
            hasher,
            validator,
            config.session.clone(),
        );
        let realtime = RealtimeEngine::new(
            config.realtime.clone(),
            sessions.clone(),
            Some(connection_repo),
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            sessions,
            accounts,
            realtime,
        })
    }
}
