use crate::errors::ApiError;
use crate::state::{AppState, Message};

/// Stamp `message` with the current time and store it under `key` with
/// the configured expiration. Returns the message as stored.
pub async fn save(state: &AppState, key: &str, mut message: Message) -> Result<Message, ApiError> {
    message.stamp();
    let bytes = serde_json::to_vec(&message).map_err(ApiError::Encode)?;

    state.store.set(key, bytes, state.expiration).await?;
    tracing::debug!(key, timestamp = message.timestamp, "message saved");

    Ok(message)
}

/// Load the message stored under `key`.
pub async fn find(state: &AppState, key: &str) -> Result<Message, ApiError> {
    let bytes = state
        .store
        .get(key)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            key: key.to_string(),
        })?;

    serde_json::from_slice(&bytes).map_err(ApiError::Corrupted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory_store::MemoryStore;
    use crate::services::message_store::MessageStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn state_with(store: Arc<MemoryStore>) -> AppState {
        AppState::new(store, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn save_then_find_returns_stamped_message() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let saved = save(&state, "abc", Message::new("hello")).await.unwrap();
        assert!(saved.timestamp > 0);

        let found = find(&state, "abc").await.unwrap();
        assert_eq!(found, saved);
    }

    #[tokio::test]
    async fn find_missing_key_is_not_found() {
        let state = state_with(Arc::new(MemoryStore::new()));
        match find(&state, "nope").await {
            Err(ApiError::NotFound { key }) => assert_eq!(key, "nope"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn undecodable_value_is_corrupted() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("bad", b"not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        let state = state_with(store);
        assert!(matches!(
            find(&state, "bad").await,
            Err(ApiError::Corrupted(_))
        ));
    }
}
