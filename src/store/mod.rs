//! Store Module
//!
//! The hash-capable key-value store the cache is layered on. Production uses
//! Redis through a connection pool; the in-memory backend serves tests and
//! local runs without a Redis server.

mod memory;
mod redis_store;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StoreResult;

pub use memory::MemoryHashStore;
pub use redis_store::RedisHashStore;

// == Hash Store Trait ==
/// Hash commands the cache needs from its backend.
///
/// Each single-field command is atomic at the store; `hgetall` and `del`
/// are atomic for the whole group key.
#[async_trait]
pub trait HashStore: Send + Sync {
    /// HGET: payload of one field, None if missing.
    async fn hget(&self, group: &str, field: &str) -> StoreResult<Option<String>>;

    /// HSET: writes one field, overwriting any previous payload.
    async fn hset(&self, group: &str, field: &str, payload: String) -> StoreResult<()>;

    /// HGETALL: every field of the group, empty if the group is missing.
    async fn hgetall(&self, group: &str) -> StoreResult<HashMap<String, String>>;

    /// HDEL: removes one field. Returns whether it existed.
    async fn hdel(&self, group: &str, field: &str) -> StoreResult<bool>;

    /// DEL: removes the whole group. Returns whether it existed.
    async fn del(&self, group: &str) -> StoreResult<bool>;
}
