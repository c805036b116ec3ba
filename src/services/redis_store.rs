use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::errors::StoreError;
use crate::services::message_store::MessageStore;

/// Redis-backed store sharing one multiplexed connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to `host:port` (database 0, no password).
    ///
    /// Makes a single connection attempt; callers treat failure as fatal.
    pub async fn connect(addr: &str) -> Result<Self, StoreError> {
        let client = Client::open(format!("redis://{}/0", addr))?;
        let conn = ConnectionManager::new_with_backoff(client, 2, 100, 0).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl MessageStore for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong != "PONG" {
            return Err(StoreError::UnexpectedPong(pong));
        }
        Ok(())
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let millis = i64::try_from(ttl.as_millis())
            .map_err(|_| StoreError::InvalidTtl(ttl))?
            .max(1) as u64;
        conn.pset_ex::<_, _, ()>(key, value, millis).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }
}
