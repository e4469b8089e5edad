use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_body_size;

    Router::new()
        // Submissions
        .route(
            "/api/submit",
            post(handlers::submit)
                .options(handlers::submit_preflight)
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(middleware::map_response(handlers::cors_headers)),
        )
        .route("/api/submit/options", get(handlers::submit_options))
        // Catalogs
        .route("/api/catalog/:collection", get(handlers::list_catalog))
        .route(
            "/api/catalog/:collection/filters",
            get(handlers::catalog_filters),
        )
        .route("/api/games/:idx", get(handlers::game_detail))
        .route("/api/spotlight", get(handlers::spotlight))
        // Raw data files
        .route("/data/*path", get(handlers::serve_data))
        // Diagnostics
        .route("/api/ping", get(handlers::ping))
        .route("/api/echo", post(handlers::echo))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
