// handlers/elevated/db.rs - /api/db/* pass-through endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::auth::ApiKeyPrincipal;
use crate::gateway::{
    AggregateCommand, AggregateResult, CollectionsResult, CountCommand, CountResult, DeleteCommand,
    DeleteResult, InfoResult, InsertCommand, InsertResult, QueryCommand, QueryResult, StatsResult,
    UpdateCommand, UpdateResult,
};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/db/info - any authenticated principal
pub async fn info(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
) -> ApiResult<InfoResult> {
    Ok(ApiResponse::success(state.gateway.info(&principal).await?))
}

/// POST /api/db/query - read
pub async fn query(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
    payload: Result<Json<QueryCommand>, JsonRejection>,
) -> ApiResult<QueryResult> {
    let Json(command) = payload?;
    Ok(ApiResponse::success(state.gateway.query(&principal, command).await?))
}

/// POST /api/db/count - read
pub async fn count(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
    payload: Result<Json<CountCommand>, JsonRejection>,
) -> ApiResult<CountResult> {
    let Json(command) = payload?;
    Ok(ApiResponse::success(state.gateway.count(&principal, command).await?))
}

/// POST /api/db/insert - write
pub async fn insert(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
    payload: Result<Json<InsertCommand>, JsonRejection>,
) -> ApiResult<InsertResult> {
    let Json(command) = payload?;
    Ok(ApiResponse::success(state.gateway.insert(&principal, command).await?))
}

/// POST /api/db/update - write
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
    payload: Result<Json<UpdateCommand>, JsonRejection>,
) -> ApiResult<UpdateResult> {
    let Json(command) = payload?;
    Ok(ApiResponse::success(state.gateway.update(&principal, command).await?))
}

/// POST /api/db/delete - delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
    payload: Result<Json<DeleteCommand>, JsonRejection>,
) -> ApiResult<DeleteResult> {
    let Json(command) = payload?;
    Ok(ApiResponse::success(state.gateway.delete(&principal, command).await?))
}

/// POST /api/db/aggregate - read
pub async fn aggregate(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
    payload: Result<Json<AggregateCommand>, JsonRejection>,
) -> ApiResult<AggregateResult> {
    let Json(command) = payload?;
    Ok(ApiResponse::success(state.gateway.aggregate(&principal, command).await?))
}

/// GET /api/db/collections - read
pub async fn collections(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
) -> ApiResult<CollectionsResult> {
    Ok(ApiResponse::success(state.gateway.collections(&principal).await?))
}

/// GET /api/db/stats - read
pub async fn stats(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
) -> ApiResult<StatsResult> {
    Ok(ApiResponse::success(state.gateway.stats(&principal).await?))
}
