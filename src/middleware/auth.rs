use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::bearer_token;
use crate::error::{ApiError, INVALID_CREDENTIALS};
use crate::services::AdminUser;
use crate::state::AppState;

/// Bearer-token middleware for admin-only routes. Inserts the `AdminUser` into request extensions.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers)?;
    let admin: AdminUser = state.admins.verify(token)?;

    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}

fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    bearer_token(auth_str).ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))
}
