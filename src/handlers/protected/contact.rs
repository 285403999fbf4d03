// handlers/protected/contact.rs - GET /api/contact

use axum::extract::State;
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Submissions, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    Ok(ApiResponse::success(state.contacts.list().await?))
}
