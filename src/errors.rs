use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure talking to the backing key/value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error("expiration {0:?} is out of range")]
    InvalidTtl(std::time::Duration),

    #[error("unexpected PING reply: {0}")]
    UnexpectedPong(String),
}

/// Errors surfaced to HTTP callers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body is not a valid message.
    #[error("{0}")]
    InvalidMessage(String),

    #[error("key does not exist")]
    NotFound { key: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bytes found under a key could not be decoded as a message.
    #[error("{0}")]
    Corrupted(serde_json::Error),

    #[error("{0}")]
    Encode(serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Corrupted(_) | ApiError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::NotFound { key } => json!({ "error": self.to_string(), "key": key }),
            _ => json!({ "error": self.to_string() }),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(body)).into_response()
    }
}

/// Invalid environment configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be at most {max} seconds, got {value}")]
    TtlTooLarge {
        name: &'static str,
        value: u64,
        max: u64,
    },

    #[error("unknown STORE_BACKEND {0:?} (expected \"redis\" or \"memory\")")]
    UnknownBackend(String),
}

/// Fatal failures of the message service process.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot connect to Redis server {addr:?}: {source}")]
    StoreUnreachable { addr: String, source: StoreError },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to install signal handlers: {0}")]
    Signal(std::io::Error),

    #[error("HTTP server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("HTTP server exited before shutdown was requested")]
    ServerExited,

    #[error("HTTP server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
