// handlers/protected/videos.rs - video writes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AdminUser, VideoInput};
use crate::state::AppState;

/// POST /api/videos - returns the stored video, including its computed excerpt
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    payload: Result<Json<VideoInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload?;
    tracing::debug!("Video create by '{}'", admin.username);
    Ok(ApiResponse::success(state.videos.create(input).await?))
}

/// PUT /api/videos/:id - full replacement of the editable fields
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<VideoInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload?;
    Ok(ApiResponse::success(state.videos.update(&id, input).await?))
}

/// DELETE /api/videos/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    state.videos.delete(&id).await?;
    Ok(ApiResponse::success(json!({
        "success": true,
        "message": "Video deleted successfully"
    })))
}
