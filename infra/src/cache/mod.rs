//! Expiring store implementations.
//!
//! `RedisStore` is the production backend; `MemoryStore` backs local
//! development and integration tests without a Redis server.

pub mod memory_store;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
