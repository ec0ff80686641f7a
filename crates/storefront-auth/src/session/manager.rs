//! Session lifecycle manager: login, refresh, verify and logout flows.
//!
//! Access tokens are never persisted; their validity is a pure function of
//! decryptability, the shared-secret tag and expiry. Refresh tokens embed a
//! random key that is honoured only while it remains in the account's
//! `sessionTokens` list.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use storefront_core::config::{AuthConfig, SessionConfig};
use storefront_core::error::AppError;
use storefront_database::repositories::AccountRepository;
use storefront_entity::account::{Account, AccountRole, AdminAccess, PublicAccount};

use crate::password::PasswordHasher;
use crate::token::{AccessClaims, Claims, RefreshClaims, TokenCodec};

use super::keys::generate_key;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// The account, without credentials.
    pub account: PublicAccount,
}

/// Result of a successful refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResult {
    /// Newly minted access token.
    pub access_token: String,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// The account, without credentials.
    pub account: PublicAccount,
}

/// Identity recovered from a valid access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Account identity key.
    pub identity: String,
    /// Account role.
    pub role: AccountRole,
    /// Admin access level, for admin tokens.
    pub access: Option<AdminAccess>,
}

impl From<AccessClaims> for VerifiedIdentity {
    fn from(claims: AccessClaims) -> Self {
        Self {
            identity: claims.sub,
            role: claims.role,
            access: claims.access,
        }
    }
}

/// Issues, validates and revokes session tokens.
#[derive(Clone)]
pub struct SessionManager {
    codec: Arc<TokenCodec>,
    accounts: AccountRepository,
    hasher: Arc<PasswordHasher>,
    auth_config: AuthConfig,
    session_config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("access_ttl_minutes", &self.auth_config.access_ttl_minutes)
            .field("refresh_ttl_days", &self.auth_config.refresh_ttl_days)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        codec: Arc<TokenCodec>,
        accounts: AccountRepository,
        hasher: Arc<PasswordHasher>,
        auth_config: AuthConfig,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            codec,
            accounts,
            hasher,
            auth_config,
            session_config,
        }
    }

    /// Looks up an account and checks its password.
    ///
    /// Unknown identities and wrong passwords produce the same `Unauthorized`
    /// error.
    pub async fn check_credentials(
        &self,
        role: AccountRole,
        identity: &str,
        password: &str,
    ) -> Result<Account, AppError> {
        let invalid = || {
            AppError::unauthorized(format!("Invalid {} or password", role.identity_label()))
        };

        let account = self
            .accounts
            .find_by_identity(role, identity)
            .await?
            .ok_or_else(invalid)?;

        if !self.hasher.verify_password(password, &account.password_hash)? {
            return Err(invalid());
        }
        Ok(account)
    }

    /// Authenticates with identity and password and opens a new session.
    ///
    /// A fresh refresh key is appended to the account's session list, so
    /// concurrent logins from several devices each get an independent key.
    pub async fn login(
        &self,
        role: AccountRole,
        identity: &str,
        password: &str,
    ) -> Result<LoginResult, AppError> {
        let account = match self.check_credentials(role, identity, password).await {
            Ok(account) => account,
            Err(e) => {
                if e.is_unauthorized() {
                    warn!(%role, identity = %identity, "Login failed");
                }
                return Err(e);
            }
        };

        let now = Utc::now();
        let refresh_expires_at = expiry(
            now,
            self.auth_config.refresh_ttl_days,
            Duration::try_days,
            "auth.refresh_ttl_days",
        )?;
        let (access_token, access_expires_at) = self.issue_access_token(&account, now)?;

        let key = generate_key(self.session_config.refresh_key_length);
        if key.is_empty() {
            return Err(AppError::configuration(
                "session.refresh_key_length must be greater than zero",
            ));
        }
        let stored = self
            .accounts
            .push_session_key(role, &account.id, &key)
            .await?;
        if !stored {
            return Err(AppError::unauthorized(format!(
                "Invalid {} or password",
                role.identity_label()
            )));
        }

        let refresh_token = self.codec.encrypt(&Claims::Refresh(RefreshClaims {
            sub: account.identity.clone(),
            role,
            key,
            iat: now.timestamp(),
            exp: refresh_expires_at.timestamp(),
        }))?;

        info!(%role, identity = %account.identity, "Login successful");

        Ok(LoginResult {
            access_token,
            refresh_token,
            access_expires_at,
            account: account.to_public(),
        })
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The refresh key is not rotated: the same refresh token keeps working
    /// until it expires or its key is removed from the account.
    pub async fn refresh(
        &self,
        role: AccountRole,
        refresh_token: &str,
    ) -> Result<RefreshResult, AppError> {
        let claims = self.decode_refresh(role, refresh_token)?;

        let account = self
            .accounts
            .find_by_identity(role, &claims.sub)
            .await?
            .filter(|account| account.has_session_key(&claims.key))
            .ok_or_else(|| AppError::unauthorized("Session has been revoked"))?;

        let (access_token, access_expires_at) = self.issue_access_token(&account, Utc::now())?;
        debug!(%role, identity = %account.identity, "Access token refreshed");

        Ok(RefreshResult {
            access_token,
            access_expires_at,
            account: account.to_public(),
        })
    }

    /// Validates an access token of any role.
    ///
    /// Returns `None` for missing, malformed, tampered, foreign or expired
    /// tokens; never an error.
    pub fn verify(&self, access_token: &str) -> Option<VerifiedIdentity> {
        self.verify_at(access_token, Utc::now())
    }

    /// Validates an access token and requires the given role.
    pub fn verify_role(&self, access_token: &str, role: AccountRole) -> Option<VerifiedIdentity> {
        self.verify(access_token)
            .filter(|identity| identity.role == role)
    }

    /// Validates an access token as of `now`.
    pub fn verify_at(&self, access_token: &str, now: DateTime<Utc>) -> Option<VerifiedIdentity> {
        self.decode_access(access_token)
            .filter(|claims| !claims.is_expired_at(now))
            .map(VerifiedIdentity::from)
    }

    /// Decrypt and tag check only; expiry is ignored.
    ///
    /// Used for websocket identification, where a stale token still names the
    /// user behind the socket.
    pub fn verify_soft(&self, access_token: &str) -> Option<VerifiedIdentity> {
        self.decode_access(access_token).map(VerifiedIdentity::from)
    }

    /// Revokes every session of an account.
    ///
    /// Returns `false` if the account no longer exists.
    pub async fn logout(&self, role: AccountRole, identity: &str) -> Result<bool, AppError> {
        let Some(account) = self.accounts.find_by_identity(role, identity).await? else {
            return Ok(false);
        };
        let cleared = self.accounts.clear_session_keys(role, &account.id).await?;
        info!(%role, identity = %identity, "All sessions revoked");
        Ok(cleared)
    }

    /// Revokes the single session behind a refresh token.
    ///
    /// Every copy of its key is removed; other devices keep their sessions.
    pub async fn revoke(&self, role: AccountRole, refresh_token: &str) -> Result<bool, AppError> {
        let claims = self.decode_refresh(role, refresh_token)?;
        let Some(account) = self.accounts.find_by_identity(role, &claims.sub).await? else {
            return Ok(false);
        };
        let removed = self
            .accounts
            .pull_session_key(role, &account.id, &claims.key)
            .await?;
        if removed {
            info!(%role, identity = %account.identity, "Session revoked");
        }
        Ok(removed)
    }

    /// Mints an access token carrying identity, role, expiry and secret tag.
    pub fn issue_access_token(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let expires_at = expiry(
            now,
            self.auth_config.access_ttl_minutes,
            Duration::try_minutes,
            "auth.access_ttl_minutes",
        )?;
        let token = self.codec.encrypt(&Claims::Access(AccessClaims {
            sub: account.identity.clone(),
            role: account.role,
            access: account.profile.admin_access(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            sec: self.auth_config.shared_secret.clone(),
        }))?;
        Ok((token, expires_at))
    }

    fn decode_access(&self, token: &str) -> Option<AccessClaims> {
        match self.codec.decrypt::<Claims>(token) {
            Ok(Claims::Access(claims)) if claims.sec == self.auth_config.shared_secret => {
                Some(claims)
            }
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Rejected access token");
                None
            }
        }
    }

    fn decode_refresh(&self, role: AccountRole, token: &str) -> Result<RefreshClaims, AppError> {
        match self.codec.decrypt::<Claims>(token)? {
            Claims::Refresh(claims) if claims.role == role => {
                if claims.is_expired_at(Utc::now()) {
                    return Err(AppError::unauthorized("Refresh token has expired"));
                }
                Ok(claims)
            }
            _ => Err(AppError::unauthorized("Invalid refresh token")),
        }
    }
}

/// Adds a configured TTL to `now`, rejecting values chrono cannot represent.
fn expiry(
    now: DateTime<Utc>,
    amount: u64,
    unit: fn(i64) -> Option<Duration>,
    setting: &str,
) -> Result<DateTime<Utc>, AppError> {
    i64::try_from(amount)
        .ok()
        .and_then(unit)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AppError::configuration(format!("{setting} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_database::MemoryDocumentStore;
    use storefront_entity::account::{AccountProfile, AdminProfile, CustomerProfile};

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    struct Fixture {
        sessions: SessionManager,
        accounts: AccountRepository,
        codec: Arc<TokenCodec>,
    }

    async fn fixture() -> Fixture {
        fixture_with(AuthConfig::default()).await
    }

    async fn fixture_with(auth_config: AuthConfig) -> Fixture {
        let accounts = AccountRepository::new(Arc::new(MemoryDocumentStore::new()));
        let hasher = Arc::new(PasswordHasher::new());
        let codec = Arc::new(TokenCodec::new(KEY));

        let customer = Account::new(
            "a@x.com",
            hasher.hash_password("p").unwrap(),
            AccountProfile::Customer(CustomerProfile::default()),
        );
        accounts.create(&customer).await.unwrap();
        let admin = Account::new(
            "root",
            hasher.hash_password("admin-pass").unwrap(),
            AccountProfile::Admin(AdminProfile::default()),
        );
        accounts.create(&admin).await.unwrap();

        let sessions = SessionManager::new(
            Arc::clone(&codec),
            accounts.clone(),
            hasher,
            auth_config,
            SessionConfig::default(),
        );
        Fixture {
            sessions,
            accounts,
            codec,
        }
    }

    #[tokio::test]
    async fn test_login_then_verify_returns_identity() {
        let f = fixture().await;
        let result = f
            .sessions
            .login(AccountRole::Customer, "a@x.com", "p")
            .await
            .unwrap();

        let identity = f.sessions.verify(&result.access_token).unwrap();
        assert_eq!(identity.identity, "a@x.com");
        assert_eq!(identity.role, AccountRole::Customer);
        assert_eq!(identity.access, None);
        assert_eq!(result.account.identity, "a@x.com");
    }

    #[tokio::test]
    async fn test_admin_token_carries_access_level() {
        let f = fixture().await;
        let result = f
            .sessions
            .login(AccountRole::Admin, "root", "admin-pass")
            .await
            .unwrap();
        let identity = f
            .sessions
            .verify_role(&result.access_token, AccountRole::Admin)
            .unwrap();
        assert_eq!(identity.access, Some(AdminAccess::Full));
        assert!(
            f.sessions
                .verify_role(&result.access_token, AccountRole::Customer)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_bad_credentials_are_unauthorized() {
        let f = fixture().await;
        let wrong = f
            .sessions
            .login(AccountRole::Customer, "a@x.com", "nope")
            .await
            .unwrap_err();
        assert!(wrong.is_unauthorized());

        let unknown = f
            .sessions
            .login(AccountRole::Customer, "b@x.com", "p")
            .await
            .unwrap_err();
        assert!(unknown.is_unauthorized());

        let wrong_role = f
            .sessions
            .login(AccountRole::Admin, "a@x.com", "p")
            .await
            .unwrap_err();
        assert!(wrong_role.is_unauthorized());
    }

    #[tokio::test]
    async fn test_refresh_until_logout() {
        let f = fixture().await;
        let login = f
            .sessions
            .login(AccountRole::Customer, "a@x.com", "p")
            .await
            .unwrap();

        let refreshed = f
            .sessions
            .refresh(AccountRole::Customer, &login.refresh_token)
            .await
            .unwrap();
        assert!(f.sessions.verify(&refreshed.access_token).is_some());

        // Not rotated: the same refresh token works again.
        assert!(
            f.sessions
                .refresh(AccountRole::Customer, &login.refresh_token)
                .await
                .is_ok()
        );

        assert!(f.sessions.logout(AccountRole::Customer, "a@x.com").await.unwrap());
        let err = f
            .sessions
            .refresh(AccountRole::Customer, &login.refresh_token)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_refresh_rejects_wrong_role_and_access_tokens() {
        let f = fixture().await;
        let login = f
            .sessions
            .login(AccountRole::Customer, "a@x.com", "p")
            .await
            .unwrap();

        let err = f
            .sessions
            .refresh(AccountRole::Admin, &login.refresh_token)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        let err = f
            .sessions
            .refresh(AccountRole::Customer, &login.access_token)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        let err = f
            .sessions
            .refresh(AccountRole::Customer, "garbage")
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_expired_refresh_token_is_rejected() {
        let f = fixture().await;
        let login = f
            .sessions
            .login(AccountRole::Customer, "a@x.com", "p")
            .await
            .unwrap();
        let account = f
            .accounts
            .find_by_identity(AccountRole::Customer, "a@x.com")
            .await
            .unwrap()
            .unwrap();

        let stale = f
            .codec
            .encrypt(&Claims::Refresh(RefreshClaims {
                sub: "a@x.com".to_string(),
                role: AccountRole::Customer,
                key: account.session_tokens[0].clone(),
                iat: 0,
                exp: Utc::now().timestamp() - 1,
            }))
            .unwrap();
        assert!(f.sessions.refresh(AccountRole::Customer, &stale).await.is_err());
        assert!(
            f.sessions
                .refresh(AccountRole::Customer, &login.refresh_token)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_expired_access_token_fails_verify() {
        let f = fixture().await;
        let past = Utc::now() - Duration::hours(2);
        let account = f
            .accounts
            .find_by_identity(AccountRole::Customer, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        let (token, expires_at) = f.sessions.issue_access_token(&account, past).unwrap();

        assert!(expires_at < Utc::now());
        assert!(f.sessions.verify(&token).is_none());
        assert!(f.sessions.verify_at(&token, past).is_some());
        // Soft verification ignores expiry.
        assert_eq!(f.sessions.verify_soft(&token).unwrap().identity, "a@x.com");
    }

    #[tokio::test]
    async fn test_foreign_secret_tag_fails_verify() {
        let f = fixture().await;
        let forged = f
            .codec
            .encrypt(&Claims::Access(AccessClaims {
                sub: "a@x.com".to_string(),
                role: AccountRole::Customer,
                access: None,
                iat: Utc::now().timestamp(),
                exp: Utc::now().timestamp() + 600,
                sec: "another-server".to_string(),
            }))
            .unwrap();
        assert!(f.sessions.verify(&forged).is_none());
        assert!(f.sessions.verify_soft(&forged).is_none());
        assert!(f.sessions.verify("").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_logins_get_distinct_keys() {
        let f = fixture().await;
        let (a, b) = tokio::join!(
            f.sessions.login(AccountRole::Customer, "a@x.com", "p"),
            f.sessions.login(AccountRole::Customer, "a@x.com", "p"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let account = f
            .accounts
            .find_by_identity(AccountRole::Customer, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.session_tokens.len(), 2);
        assert_ne!(account.session_tokens[0], account.session_tokens[1]);

        assert!(f.sessions.refresh(AccountRole::Customer, &a.refresh_token).await.is_ok());
        assert!(f.sessions.refresh(AccountRole::Customer, &b.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke_single_session() {
        let f = fixture().await;
        let a = f
            .sessions
            .login(AccountRole::Customer, "a@x.com", "p")
            .await
            .unwrap();
        let b = f
            .sessions
            .login(AccountRole::Customer, "a@x.com", "p")
            .await
            .unwrap();

        assert!(f.sessions.revoke(AccountRole::Customer, &a.refresh_token).await.unwrap());
        assert!(f.sessions.refresh(AccountRole::Customer, &a.refresh_token).await.is_err());
        assert!(f.sessions.refresh(AccountRole::Customer, &b.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_out_of_range_ttls_fail_login_without_storing_a_key() {
        let settings = [
            AuthConfig {
                access_ttl_minutes: 1 << 40,
                ..AuthConfig::default()
            },
            AuthConfig {
                refresh_ttl_days: u64::MAX,
                ..AuthConfig::default()
            },
        ];
        for auth_config in settings {
            let f = fixture_with(auth_config).await;
            let err = f
                .sessions
                .login(AccountRole::Customer, "a@x.com", "p")
                .await
                .unwrap_err();
            assert_eq!(err.kind, storefront_core::error::ErrorKind::Configuration);

            let account = f
                .accounts
                .find_by_identity(AccountRole::Customer, "a@x.com")
                .await
                .unwrap()
                .unwrap();
            assert!(account.session_tokens.is_empty());
        }
    }

    #[tokio::test]
    async fn test_longest_allowed_refresh_ttl_is_usable() {
        let f = fixture_with(AuthConfig {
            refresh_ttl_days: storefront_core::config::auth::MAX_REFRESH_TTL_DAYS,
            ..AuthConfig::default()
        })
        .await;
        let login = f
            .sessions
            .login(AccountRole::Customer, "a@x.com", "p")
            .await
            .unwrap();
        assert!(
            f.sessions
                .refresh(AccountRole::Customer, &login.refresh_token)
                .await
                .is_ok()
        );
    }
}
