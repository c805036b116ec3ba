use std::time::Duration;

use async_trait::async_trait;

use crate::errors::StoreError;

/// Key/value store holding serialized messages.
///
/// Implementations must be safe to share across all in-flight requests.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Liveness check against the store.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Write `value` under `key`, replacing any previous value and
    /// resetting its expiration to `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError>;

    /// Read the value under `key`. `Ok(None)` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}
