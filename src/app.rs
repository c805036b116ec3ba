use std::time::Duration;

use axum::{http::StatusCode, middleware, response::IntoResponse, Json, Router};
use serde_json::json;
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::cors::cors;
use crate::routes::{message_routes, system_routes};
use crate::state::AppState;

/// HTTP timeouts applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Time allowed to receive the request body.
    pub read: Duration,
    /// Time allowed to produce the whole response.
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(10),
            write: Duration::from_secs(20),
        }
    }
}

/// Build the complete Axum application:
/// - GET  /health  (liveness)
/// - POST /{key}   (save)
/// - GET  /{key}   (find)
///
/// CORS headers are added to every response, the fallback included.
pub fn build_app(state: AppState, timeouts: Timeouts) -> Router {
    Router::new()
        .merge(system_routes::routes())
        .merge(message_routes::routes())
        .fallback(not_found)
        .with_state(state)
        .layer(TimeoutLayer::new(timeouts.write))
        .layer(RequestBodyTimeoutLayer::new(timeouts.read))
        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(cors))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
