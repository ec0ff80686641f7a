//! Customer handlers: sessions, signup and profile.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use storefront_auth::{LoginResult, RefreshResult};
use storefront_entity::account::{AccountRole, PublicAccount};

use crate::dto::request::{
    ConfirmRequest, CustomerLoginRequest, RefreshRequest, SignupRequest, UpdateCustomerRequest,
};
use crate::dto::response::{ApiResponse, RevokedResponse, SignupResponse, VerifyResponse};
use crate::error::ApiResult;
use crate::extractors::{CustomerAuth, ValidJson};
use crate::state::AppState;

/// POST /api/customers/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CustomerLoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResult>>> {
    let result = state
        .sessions
        .login(AccountRole::Customer, &req.email, &req.password)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/customers/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<RefreshResult>>> {
    let result = state
        .sessions
        .refresh(AccountRole::Customer, &req.token)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/customers/verify
pub async fn verify(CustomerAuth(identity): CustomerAuth) -> Json<ApiResponse<VerifyResponse>> {
    Json(ApiResponse::ok(identity.into()))
}

/// POST /api/customers/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: CustomerAuth,
) -> ApiResult<Json<ApiResponse<RevokedResponse>>> {
    let revoked = state
        .sessions
        .logout(AccountRole::Customer, &auth.identity)
        .await?;
    Ok(Json(ApiResponse::ok(RevokedResponse { revoked })))
}

/// POST /api/customers/revoke
pub async fn revoke(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<RevokedResponse>>> {
    let revoked = state
        .sessions
        .revoke(AccountRole::Customer, &req.token)
        .await?;
    Ok(Json(ApiResponse::ok(RevokedResponse { revoked })))
}

/// POST /api/customers/signup
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SignupResponse>>)> {
    let pending = state
        .accounts
        .signup(&req.email, &req.password, req.profile)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(SignupResponse {
            email: pending.email,
            confirmation_token: pending.token,
            expires_in_hours: state.config.session.pending_ttl_hours,
        })),
    ))
}

/// POST /api/customers/confirm
pub async fn confirm(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ConfirmRequest>,
) -> ApiResult<Json<ApiResponse<PublicAccount>>> {
    let account = state.accounts.confirm_signup(&req.token).await?;
    Ok(Json(ApiResponse::ok(account)))
}

/// PUT /api/customers
pub async fn update(
    State(state): State<AppState>,
    auth: CustomerAuth,
    ValidJson(req): ValidJson<UpdateCustomerRequest>,
) -> ApiResult<Json<ApiResponse<PublicAccount>>> {
    let account = state
        .accounts
        .update_customer_profile(&auth.identity, &req.password, req.profile)
        .await?;
    Ok(Json(ApiResponse::ok(account)))
}
