// handlers/public/videos.rs - read-only video endpoints

use axum::extract::{Path, Query, State};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{VideoListQuery, VideoPage};
use crate::state::AppState;

/// GET /api/videos?page&limit&tag - newest day first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
) -> ApiResult<VideoPage> {
    Ok(ApiResponse::success(state.videos.list(query).await?))
}

/// GET /api/videos/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    Ok(ApiResponse::success(state.videos.get(&id).await?))
}

/// GET /api/videos/tags/all - ["All", ...sorted tags]
pub async fn tags(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::success(state.videos.tags().await?))
}
