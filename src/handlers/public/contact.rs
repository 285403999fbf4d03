// handlers/public/contact.rs - POST /api/contact

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ContactInput;
use crate::state::AppState;

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ContactInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload?;
    Ok(ApiResponse::success(state.contacts.submit(input).await?))
}
