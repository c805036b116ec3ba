use axum::{routing::get, Router};

use crate::routes::message_routes::save_key;
use crate::state::AppState;

/// `/health` shadows `/:key` in the router, so POST still has to reach
/// the save handler for the key `health`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health).post(save_key))
}

/// GET /health
///
/// Liveness only; never touches the store.
async fn health() -> &'static str {
    "ok"
}
