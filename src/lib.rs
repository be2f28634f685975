//! Hash Cache - cache entries stored as fields of Redis hashes
//!
//! Adds per-field expiration, versioning and race-condition mitigation on
//! top of hash commands, which have no per-field TTL of their own.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::AppState;
pub use cache::{HashCache, HashCacheOptions};
pub use config::Config;
pub use error::{HashCacheError, StoreError};
pub use store::{HashStore, MemoryHashStore, RedisHashStore};
