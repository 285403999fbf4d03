// handlers/protected/admin.rs - POST /api/admin/verify

use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AdminUser;

/// Reaching this handler means the middleware already accepted the token
pub async fn verify(Extension(admin): Extension<AdminUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "valid": true, "user": admin })))
}
