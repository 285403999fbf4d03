use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::ApiKeyPrincipal;
use crate::error::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_USER_HEADER: &str = "x-api-user";

/// Resolves `X-Api-User` + `X-Api-Key` to an `ApiKeyPrincipal` for the gateway routes.
/// Permission checks happen per operation inside the gateway.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = header_str(&headers, API_USER_HEADER)?;
    let key = header_str(&headers, API_KEY_HEADER)?;

    let principal: ApiKeyPrincipal = state.api_keys.authenticate(identity, key)?;
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::unauthorized(format!("Missing {} header", name)))
}
