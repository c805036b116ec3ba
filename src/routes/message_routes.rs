use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::errors::ApiError;
use crate::services::message_service;
use crate::state::{AppState, Message};

/// Body returned by both save and find.
#[derive(Debug, Serialize)]
pub struct KeyedMessage {
    pub key: String,
    pub message: Message,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/:key", get(find_key).post(save_key))
}

//
// ─────────────────────────────────────────────────────────────
// POST /{key}
// Store {"value": ...} under key with a fresh timestamp
// ─────────────────────────────────────────────────────────────
//
pub(crate) async fn save_key(
    Path(key): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<KeyedMessage>, ApiError> {
    let message = Message::from_request_body(&body)?;
    let message = message_service::save(&state, &key, message).await?;
    Ok(Json(KeyedMessage { key, message }))
}

//
// ─────────────────────────────────────────────────────────────
// GET /{key}
// Return the stored message or 404
// ─────────────────────────────────────────────────────────────
//
async fn find_key(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<KeyedMessage>, ApiError> {
    let message = message_service::find(&state, &key).await?;
    Ok(Json(KeyedMessage { key, message }))
}
