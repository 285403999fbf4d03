// handlers/public/admin.rs - POST /api/admin/login and POST /api/admin/create

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{Credentials, LoginResponse};
use crate::state::AppState;

/// POST /api/admin/login - exchange credentials for a session token
///
/// Unknown usernames and wrong passwords both yield 401 "Invalid username or password".
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(credentials) = payload?;
    let response = state.admins.login(credentials).await?;
    Ok(ApiResponse::success(response))
}

/// POST /api/admin/create - create an admin account (403 when disabled by configuration)
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(credentials) = payload?;
    let response = state.admins.create(credentials).await?;
    Ok(ApiResponse::success(response))
}
