//! Router for the feedbeat HTTP surface.
//!
//! One static route serves the feed icon; every other path gets a
//! JSON-typed 404.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared router state.
pub struct AppState {
    /// Directory holding static assets.
    pub assets_dir: PathBuf,
}

/// Create the router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/images/rss.png", get(feed_icon))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the feed icon.
async fn feed_icon(State(state): State<Arc<AppState>>) -> Response {
    let path = state.assets_dir.join("rss.png");
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) => {
            info!("failed to read feed icon {:?}: {}", path, e);
            (StatusCode::NOT_FOUND, "404 Not Found").into_response()
        }
    }
}

/// JSON-typed 404 for everything else.
async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))).into_response()
}
