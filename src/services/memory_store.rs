use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::services::message_store::MessageStore;

/// A single entry with its expiry deadline.
#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-process store with lazy TTL expiry.
///
/// Expired entries are dropped the next time they are read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys, expired or not.
    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or(StoreError::InvalidTtl(ttl))?;
        let entry = Entry { value, expires_at };
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        {
            let map = self.map.read().unwrap_or_else(|e| e.into_inner());
            match map.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {}
            }
        }

        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        if map
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            map.remove(key);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_replaces_and_get_reads() {
        let store = MemoryStore::new();
        store.set("k", b"one".to_vec(), Duration::from_secs(60)).await.unwrap();
        store.set("k", b"two".to_vec(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_are_absent_and_evicted() {
        let store = MemoryStore::new();
        store.set("k", b"v".to_vec(), Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn unrepresentable_ttl_is_an_error() {
        let store = MemoryStore::new();
        let err = store
            .set("k", b"v".to_vec(), Duration::from_secs(u64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTtl(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn len_survives_a_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let mut map = poisoner.map.write().unwrap();
            map.insert(
                "k".to_string(),
                Entry {
                    value: b"v".to_vec(),
                    expires_at: Instant::now() + Duration::from_secs(60),
                },
            );
            panic!("poison the lock");
        })
        .join();

        assert!(store.map.is_poisoned());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn save_resets_expiration() {
        let store = MemoryStore::new();
        store.set("k", b"a".to_vec(), Duration::from_millis(300)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        store.set("k", b"b".to_vec(), Duration::from_millis(300)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.get("k").await.unwrap(), Some(b"b".to_vec()));
    }
}
