//! Account repository implementation.

use std::sync::Arc;

use serde_json::json;

use storefront_core::error::AppError;
use storefront_core::result::AppResult;
use storefront_core::traits::{DocumentStore, DocumentStoreExt};
use storefront_entity::account::{Account, AccountProfile, AccountRole};

/// Repository for customer and admin accounts.
///
/// Each role lives in its own collection; the role argument picks it.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    store: Arc<dyn DocumentStore>,
}

impl AccountRepository {
    /// Create a new account repository.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Find an account by its identity key (email or admin name).
    pub async fn find_by_identity(
        &self,
        role: AccountRole,
        identity: &str,
    ) -> AppResult<Option<Account>> {
        self.store
            .find_typed(role.collection(), Account::IDENTITY_FIELD, identity)
            .await
    }

    /// Find an account by document id.
    pub async fn find_by_id(&self, role: AccountRole, id: &str) -> AppResult<Option<Account>> {
        self.store.get_typed(role.collection(), id).await
    }

    /// Persist a new account. Fails with `Validation` if the identity is taken.
    pub async fn create(&self, account: &Account) -> AppResult<()> {
        let doc = serde_json::to_value(account)?;
        let inserted = self
            .store
            .insert_unique(
                account.role.collection(),
                &account.id,
                Account::IDENTITY_FIELD,
                doc,
            )
            .await?;
        if !inserted {
            return Err(AppError::validation(format!(
                "An account with this {} already exists",
                account.role.identity_label()
            )));
        }
        Ok(())
    }

    /// Append a refresh key to the account's session list.
    pub async fn push_session_key(&self, role: AccountRole, id: &str, key: &str) -> AppResult<bool> {
        self.store
            .push_to_list(role.collection(), id, Account::SESSION_TOKENS_FIELD, key)
            .await
    }

    /// Remove every occurrence of a refresh key.
    pub async fn pull_session_key(&self, role: AccountRole, id: &str, key: &str) -> AppResult<bool> {
        self.store
            .pull_from_list(role.collection(), id, Account::SESSION_TOKENS_FIELD, key)
            .await
    }

    /// Drop every refresh key, revoking all sessions of the account.
    pub async fn clear_session_keys(&self, role: AccountRole, id: &str) -> AppResult<bool> {
        self.store
            .set_field(role.collection(), id, Account::SESSION_TOKENS_FIELD, json!([]))
            .await
    }

    /// Replace the password hash and revoke all sessions.
    pub async fn update_password(
        &self,
        role: AccountRole,
        id: &str,
        password_hash: &str,
    ) -> AppResult<bool> {
        let updated = self
            .store
            .set_field(
                role.collection(),
                id,
                Account::PASSWORD_HASH_FIELD,
                json!(password_hash),
            )
            .await?;
        if !updated {
            return Ok(false);
        }
        self.clear_session_keys(role, id).await
    }

    /// Replace the role-specific profile.
    pub async fn update_profile(&self, id: &str, profile: &AccountProfile) -> AppResult<bool> {
        let value = serde_json::to_value(profile)?;
        self.store
            .set_field(profile.role().collection(), id, Account::PROFILE_FIELD, value)
            .await
    }

    /// List every account of a role.
    pub async fn list(&self, role: AccountRole) -> AppResult<Vec<Account>> {
        self.store
            .list(role.collection())
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }
}
