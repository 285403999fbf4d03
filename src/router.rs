use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{api_key_middleware, jwt_auth_middleware};
use crate::state::AppState;

/// Full application router. Every route except `/health` lives under the configured prefix.
pub fn app(state: AppState) -> Router {
    let prefix = state.config.server.api_prefix.trim_end_matches('/').to_string();
    let cors = cors_layer(&state.config.security);

    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(gateway_routes(state.clone()));

    let api = if prefix.is_empty() {
        api
    } else {
        Router::new()
            .route(&format!("{}/", prefix), get(public::root::root))
            .nest(&prefix, api)
    };

    api.route("/health", get(public::root::health))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root::root))
        .route("/admin/login", post(public::admin::login))
        .route("/admin/create", post(public::admin::create))
        .route("/videos", get(public::videos::list))
        .route("/videos/tags/all", get(public::videos::tags))
        .route("/videos/:id", get(public::videos::get))
        .route("/contact", post(public::contact::submit))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/verify", post(protected::admin::verify))
        .route("/videos", post(protected::videos::create))
        .route(
            "/videos/:id",
            axum::routing::put(protected::videos::update).delete(protected::videos::delete),
        )
        .route("/contact", get(protected::contact::list))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn gateway_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/db/info", get(elevated::db::info))
        .route("/db/query", post(elevated::db::query))
        .route("/db/count", post(elevated::db::count))
        .route("/db/insert", post(elevated::db::insert))
        .route("/db/update", post(elevated::db::update))
        .route("/db/delete", post(elevated::db::delete))
        .route("/db/aggregate", post(elevated::db::aggregate))
        .route("/db/collections", get(elevated::db::collections))
        .route("/db/stats", get(elevated::db::stats))
        .route_layer(middleware::from_fn_with_state(state, api_key_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
