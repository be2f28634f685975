//! Redis-backed hash store.

use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use tracing::info;

use super::HashStore;
use crate::error::{StoreError, StoreResult};

/// Hash store over a pooled Redis connection.
///
/// Every command checks a connection out of the pool and hands it back when
/// the guard drops, on success and failure alike.
#[derive(Clone)]
pub struct RedisHashStore {
    pool: Pool,
}

impl RedisHashStore {
    /// Wraps an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates a connection pool and checks the server answers PING.
    pub async fn connect(url: &str, pool_size: usize) -> StoreResult<Self> {
        info!("Creating Redis connection pool for hash cache...");

        let pool = Config::from_url(url)
            .builder()
            .map_err(|e| StoreError::Unavailable(format!("Invalid Redis config: {}", e)))?
            .max_size(pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Failed to create pool: {}", e)))?;

        let mut conn = pool.get().await?;
        redis::cmd("PING").query_async::<String>(&mut *conn).await?;

        info!("Redis connection pool created successfully");
        Ok(Self::new(pool))
    }

    async fn conn(&self) -> StoreResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl HashStore for RedisHashStore {
    async fn hget(&self, group: &str, field: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn().await?;
        let payload: Option<String> = conn.hget(group, field).await?;
        Ok(payload)
    }

    async fn hset(&self, group: &str, field: &str, payload: String) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let _: () = conn.hset(group, field, payload).await?;
        Ok(())
    }

    async fn hgetall(&self, group: &str) -> StoreResult<HashMap<String, String>> {
        let mut conn = self.conn().await?;
        let fields: HashMap<String, String> = conn.hgetall(group).await?;
        Ok(fields)
    }

    async fn hdel(&self, group: &str, field: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let removed: i64 = conn.hdel(group, field).await?;
        Ok(removed > 0)
    }

    async fn del(&self, group: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let removed: i64 = conn.del(group).await?;
        Ok(removed > 0)
    }
}
