//! Account lifecycle: customer signup and confirmation, profile updates,
//! credential changes, and account seeding.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use storefront_core::config::SessionConfig;
use storefront_core::error::AppError;
use storefront_database::repositories::{AccountRepository, PendingCustomerRepository};
use storefront_entity::account::{
    Account, AccountProfile, AccountRole, CustomerProfile, PublicAccount,
};
use storefront_entity::pending::PendingCustomer;

use crate::password::{PasswordHasher, PasswordValidator};
use crate::session::{SessionManager, generate_key};

/// Manages account records outside of the session flow.
#[derive(Debug, Clone)]
pub struct AccountManager {
    accounts: AccountRepository,
    pending: PendingCustomerRepository,
    sessions: SessionManager,
    hasher: Arc<PasswordHasher>,
    validator: PasswordValidator,
    session_config: SessionConfig,
}

impl AccountManager {
    /// Creates a new account manager.
    pub fn new(
        accounts: AccountRepository,
        pending: PendingCustomerRepository,
        sessions: SessionManager,
        hasher: Arc<PasswordHasher>,
        validator: PasswordValidator,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            accounts,
            pending,
            sessions,
            hasher,
            validator,
            session_config,
        }
    }

    /// Registers a pending customer signup and returns it.
    ///
    /// The confirmation token of the returned record is what the customer
    /// presents to [`confirm_signup`](Self::confirm_signup).
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        profile: CustomerProfile,
    ) -> Result<PendingCustomer, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        self.validator.validate(password)?;

        if self
            .accounts
            .find_by_identity(AccountRole::Customer, email)
            .await?
            .is_some()
        {
            return Err(AppError::validation("Email is already registered"));
        }
        if self.pending.find_by_email(email).await?.is_some() {
            return Err(AppError::validation("A signup for this email is already pending"));
        }

        let pending = PendingCustomer {
            token: generate_key(self.session_config.refresh_key_length),
            email: email.to_string(),
            password_hash: self.hasher.hash_password(password)?,
            profile,
            created_at: Utc::now(),
        };

        let ttl = Duration::from_secs(self.session_config.pending_ttl_hours * 3600);
        if !self.pending.create(&pending, ttl).await? {
            return Err(AppError::internal("Confirmation token collision"));
        }

        info!(email = %pending.email, "Customer signup pending confirmation");
        Ok(pending)
    }

    /// Turns a live pending signup into a customer account.
    ///
    /// The account is written before the pending record is consumed, so a
    /// failed write leaves the signup confirmable. A concurrent second
    /// confirmation loses on the identity uniqueness check.
    pub async fn confirm_signup(&self, token: &str) -> Result<PublicAccount, AppError> {
        let pending = self
            .pending
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Signup not found or expired"))?;

        let account = Account::new(
            pending.email,
            pending.password_hash,
            AccountProfile::Customer(pending.profile),
        );
        self.accounts.create(&account).await?;

        if !self.pending.delete(token).await? {
            debug!(email = %account.identity, "Pending signup was already gone after confirmation");
        }

        info!(email = %account.identity, "Customer signup confirmed");
        Ok(account.to_public())
    }

    /// Replaces a customer's profile after re-checking the password.
    pub async fn update_customer_profile(
        &self,
        email: &str,
        password: &str,
        profile: CustomerProfile,
    ) -> Result<PublicAccount, AppError> {
        let mut account = self
            .sessions
            .check_credentials(AccountRole::Customer, email, password)
            .await?;

        account.profile = AccountProfile::Customer(profile);
        if !self.accounts.update_profile(&account.id, &account.profile).await? {
            return Err(AppError::not_found("Account no longer exists"));
        }

        info!(email = %account.identity, "Customer profile updated");
        Ok(account.to_public())
    }

    /// Changes an admin password and revokes every session of that admin.
    pub async fn change_admin_password(
        &self,
        name: &str,
        password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let account = self
            .sessions
            .check_credentials(AccountRole::Admin, name, password)
            .await?;
        self.validator.validate(new_password)?;

        let hash = self.hasher.hash_password(new_password)?;
        if !self
            .accounts
            .update_password(AccountRole::Admin, &account.id, &hash)
            .await?
        {
            return Err(AppError::not_found("Account no longer exists"));
        }

        info!(name = %account.identity, "Admin password changed, sessions revoked");
        Ok(())
    }

    /// Creates a confirmed account directly, bypassing signup.
    pub async fn create_account(
        &self,
        identity: &str,
        password: &str,
        profile: AccountProfile,
    ) -> Result<PublicAccount, AppError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(AppError::validation(format!(
                "{} is required",
                profile.role().identity_label()
            )));
        }
        self.validator.validate(password)?;

        let account = Account::new(identity, self.hasher.hash_password(password)?, profile);
        self.accounts.create(&account).await?;

        info!(role = %account.role, identity = %account.identity, "Account created");
        Ok(account.to_public())
    }
}
