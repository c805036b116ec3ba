pub mod memory_store;
pub mod message_service;
pub mod message_store;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use message_store::MessageStore;
pub use redis_store::RedisStore;
