//! In-memory hash store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::HashStore;
use crate::error::StoreResult;

// == Memory Hash Store ==
/// Group key → (field key → payload), kept in process memory.
///
/// A group disappears once its last field is removed, mirroring Redis.
#[derive(Debug, Default)]
pub struct MemoryHashStore {
    groups: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups currently stored.
    pub async fn len(&self) -> usize {
        self.groups.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.groups.read().await.is_empty()
    }
}

#[async_trait]
impl HashStore for MemoryHashStore {
    async fn hget(&self, group: &str, field: &str) -> StoreResult<Option<String>> {
        let groups = self.groups.read().await;
        Ok(groups.get(group).and_then(|fields| fields.get(field)).cloned())
    }

    async fn hset(&self, group: &str, field: &str, payload: String) -> StoreResult<()> {
        let mut groups = self.groups.write().await;
        groups
            .entry(group.to_string())
            .or_default()
            .insert(field.to_string(), payload);
        Ok(())
    }

    async fn hgetall(&self, group: &str) -> StoreResult<HashMap<String, String>> {
        let groups = self.groups.read().await;
        Ok(groups.get(group).cloned().unwrap_or_default())
    }

    async fn hdel(&self, group: &str, field: &str) -> StoreResult<bool> {
        let mut groups = self.groups.write().await;
        let Some(fields) = groups.get_mut(group) else {
            return Ok(false);
        };
        let removed = fields.remove(field).is_some();
        if fields.is_empty() {
            groups.remove(group);
        }
        Ok(removed)
    }

    async fn del(&self, group: &str) -> StoreResult<bool> {
        Ok(self.groups.write().await.remove(group).is_some())
    }
}
