//! Update hook: fans a changed resource out to its websocket subscribers.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::Value;

use storefront_core::error::AppError;

use crate::dto::response::{ApiResponse, UpdateResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the update hook key.
pub const KEY_HEADER: &str = "key";

/// Reads the resource id from `id` or `_id`, accepting strings and numbers.
fn resource_id(body: &Value) -> Option<String> {
    ["id", "_id"]
        .iter()
        .filter_map(|field| body.get(field))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// POST /update
pub async fn publish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<Json<ApiResponse<UpdateResponse>>> {
    let key = headers
        .get(KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !state.realtime.accepts_update_key(key) {
        return Err(AppError::unauthorized("Invalid update key").into());
    }

    let id = resource_id(&body).ok_or_else(|| AppError::validation("Update body needs an id"))?;
    let delivered = state.realtime.publish_update(&id, body).await;

    Ok(Json(ApiResponse::ok(UpdateResponse { id, delivered })))
}
