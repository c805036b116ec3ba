use std::sync::Arc;
use std::time::Duration;

use crate::services::message_store::MessageStore;

/// Shared application context handed to every handler.
///
/// Holds the single store handle built at startup and the uniform
/// expiration applied to every saved key.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
    pub expiration: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn MessageStore>, expiration: Duration) -> Self {
        Self { store, expiration }
    }
}
