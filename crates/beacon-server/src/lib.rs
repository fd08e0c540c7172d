//! Beacon server library logic.

pub mod api_events;
pub mod config;
pub mod validate;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use beacon_db::DbPool;
use beacon_notify::{DeviceRegistry, Dispatcher};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Device registry client, also used by the latest-event aggregation.
    pub registry: Arc<dyn DeviceRegistry>,
    /// Push-notification dispatcher.
    pub dispatcher: Arc<Dispatcher>,
}

/// Maximum request body size (1 MiB). Event payloads are small.
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/events", post(api_events::save_event_handler))
        .route("/api/events/query", post(api_events::get_events_handler))
        .route("/api/events/latest", get(api_events::latest_events_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
