pub mod config;
pub mod data;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{delete_file, get_files, health_check, upload_files},
    state::AppState,
};

/// Build the HTTP router with every route and layer attached.
pub fn build_router(state: AppState) -> Router {
    // Only the configured client origin may call the API from a browser
    let origin = if state.config.cors_origin == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(state.config.cors_origin.parse::<HeaderValue>().ok())
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/file/upload", post(upload_files))
        .route("/api/file/getfiles", get(get_files))
        .route("/api/file/delete", delete(delete_file))
        .layer(DefaultBodyLimit::max(state.config.max_request_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
