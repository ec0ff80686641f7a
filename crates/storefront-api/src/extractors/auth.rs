//! Access-token extractors for customer and admin routes.
//!
//! The token is read from the `token` header, falling back to
//! `Authorization: Bearer <token>`.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use storefront_auth::VerifiedIdentity;
use storefront_core::error::AppError;
use storefront_entity::account::AccountRole;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "token";

/// Returns the access token presented with a request, if any.
pub fn access_token(headers: &HeaderMap) -> Option<&str> {
    let from_header = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    from_header.or_else(|| {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    })
}

fn authenticate(
    parts: &Parts,
    state: &AppState,
    role: AccountRole,
) -> Result<VerifiedIdentity, ApiError> {
    let token = access_token(&parts.headers)
        .ok_or_else(|| AppError::unauthorized("Missing access token"))?;

    let identity = state
        .sessions
        .verify_role(token, role)
        .ok_or_else(|| AppError::unauthorized("Invalid or expired access token"))?;

    Ok(identity)
}

/// A request authenticated with a valid customer access token.
#[derive(Debug, Clone)]
pub struct CustomerAuth(pub VerifiedIdentity);

impl std::ops::Deref for CustomerAuth {
    type Target = VerifiedIdentity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for CustomerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, AccountRole::Customer).map(Self)
    }
}

/// A request authenticated with a valid admin access token.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub VerifiedIdentity);

impl std::ops::Deref for AdminAuth {
    type Target = VerifiedIdentity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, AccountRole::Admin).map(Self)
    }
}
