//! Admin handlers: sessions and credential changes.

use axum::Json;
use axum::extract::State;

use storefront_auth::{LoginResult, RefreshResult};
use storefront_entity::account::AccountRole;

use crate::dto::request::{AdminLoginRequest, ChangeAdminPasswordRequest, RefreshRequest};
use crate::dto::response::{ApiResponse, RevokedResponse, VerifyResponse};
use crate::error::ApiResult;
use crate::extractors::{AdminAuth, ValidJson};
use crate::state::AppState;

/// POST /api/admins/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<AdminLoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResult>>> {
    let result = state
        .sessions
        .login(AccountRole::Admin, &req.name, &req.password)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/admins/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<RefreshResult>>> {
    let result = state.sessions.refresh(AccountRole::Admin, &req.token).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/admins/verify
pub async fn verify(AdminAuth(identity): AdminAuth) -> Json<ApiResponse<VerifyResponse>> {
    Json(ApiResponse::ok(identity.into()))
}

/// POST /api/admins/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AdminAuth,
) -> ApiResult<Json<ApiResponse<RevokedResponse>>> {
    let revoked = state
        .sessions
        .logout(AccountRole::Admin, &auth.identity)
        .await?;
    Ok(Json(ApiResponse::ok(RevokedResponse { revoked })))
}

/// POST /api/admins/revoke
pub async fn revoke(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<RevokedResponse>>> {
    let revoked = state.sessions.revoke(AccountRole::Admin, &req.token).await?;
    Ok(Json(ApiResponse::ok(RevokedResponse { revoked })))
}

/// PUT /api/admins
///
/// Changing the password revokes every session, including the caller's.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidJson(req): ValidJson<ChangeAdminPasswordRequest>,
) -> ApiResult<Json<ApiResponse<RevokedResponse>>> {
    state
        .accounts
        .change_admin_password(&auth.identity, &req.password, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(RevokedResponse { revoked: true })))
}
