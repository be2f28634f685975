//! Hash Entry Gateway
//!
//! Maps entries onto hash fields and contains every store failure behind a
//! failsafe boundary: the failure is logged, reported to the error handler
//! and replaced by a safe default.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::error;

use crate::cache::codec::codec_for;
use crate::cache::Entry;
use crate::error::{Result, StoreError, StoreResult};
use crate::store::HashStore;

// == Error Notification ==
/// A store failure swallowed by the gateway.
#[derive(Debug)]
pub struct StoreFailure<'a> {
    /// Store command that failed
    pub method: &'static str,
    pub error: &'a StoreError,
}

/// Callback notified of every swallowed store failure.
pub type ErrorHandler = Arc<dyn Fn(&StoreFailure<'_>) + Send + Sync>;

// == Hash Gateway ==
#[derive(Clone)]
pub struct HashGateway {
    store: Arc<dyn HashStore>,
    error_handler: Option<ErrorHandler>,
}

impl HashGateway {
    pub fn new(store: Arc<dyn HashStore>) -> Self {
        Self {
            store,
            error_handler: None,
        }
    }

    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    // == Failsafe ==
    /// Unwraps a store result, falling back to `returning` on failure.
    fn failsafe<T>(&self, method: &'static str, result: StoreResult<T>, returning: T) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                error!(method, error = %e, "Hash store command failed");
                if let Some(handler) = &self.error_handler {
                    handler(&StoreFailure { method, error: &e });
                }
                returning
            }
        }
    }

    // == Get Field ==
    /// Reads and decodes one field. Missing, undecodable or unreachable all
    /// come back as None.
    pub async fn get_field(&self, prefix: &str, key: &str, raw: bool) -> Option<Entry> {
        let payload = self.failsafe("hget", self.store.hget(prefix, key).await, None);
        codec_for(raw).deserialize(payload.as_deref())
    }

    // == Set Field ==
    /// Encodes and writes one field. Returns false when the store failed.
    ///
    /// Encoding errors are caller errors and propagate.
    pub async fn set_field(&self, prefix: &str, key: &str, entry: &Entry, raw: bool) -> Result<bool> {
        let payload = codec_for(raw).serialize(entry)?;
        let result = self.store.hset(prefix, key, payload).await.map(|_| true);
        Ok(self.failsafe("hset", result, false))
    }

    // == Delete Field ==
    /// Removes one field. Deleting a missing field still succeeds.
    pub async fn delete_field(&self, prefix: &str, key: &str) -> bool {
        let result = self.store.hdel(prefix, key).await.map(|_| true);
        self.failsafe("hdel", result, false)
    }

    // == Get All Fields ==
    /// Reads and decodes every field of a group, dropping undecodable ones.
    pub async fn get_all_fields(&self, prefix: &str, raw: bool) -> HashMap<String, Entry> {
        let payloads = self.failsafe("hgetall", self.store.hgetall(prefix).await, HashMap::new());
        let codec = codec_for(raw);

        payloads
            .into_iter()
            .filter_map(|(key, payload)| codec.deserialize(Some(&payload)).map(|entry| (key, entry)))
            .collect()
    }

    // == Delete Group ==
    /// Removes the whole group key in one command.
    pub async fn delete_group(&self, prefix: &str) -> bool {
        let result = self.store.del(prefix).await.map(|_| true);
        self.failsafe("del", result, false)
    }
}

impl fmt::Debug for HashGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashGateway")
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryHashStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DownStore;

    #[async_trait]
    impl HashStore for DownStore {
        async fn hget(&self, _: &str, _: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn hset(&self, _: &str, _: &str, _: String) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn hgetall(&self, _: &str) -> StoreResult<HashMap<String, String>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn hdel(&self, _: &str, _: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn del(&self, _: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_round_trip_through_store() {
        let gateway = HashGateway::new(Arc::new(MemoryHashStore::new()));
        let entry = Entry::new(json!({"n": 1}), None, Some("v1".into()));

        assert!(gateway.set_field("g", "k", &entry, false).await.unwrap());
        assert_eq!(gateway.get_field("g", "k", false).await, Some(entry));
        assert!(gateway.get_field("g", "other", false).await.is_none());
    }

    #[tokio::test]
    async fn test_get_all_skips_undecodable_fields() {
        let store = Arc::new(MemoryHashStore::new());
        store.hset("g", "bad", "not json".into()).await.unwrap();
        let gateway = HashGateway::new(store);
        gateway
            .set_field("g", "good", &Entry::plain(json!(1)), false)
            .await
            .unwrap();

        let all = gateway.get_all_fields("g", false).await;
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("good"));
    }

    #[tokio::test]
    async fn test_delete_missing_field_succeeds() {
        let gateway = HashGateway::new(Arc::new(MemoryHashStore::new()));
        assert!(gateway.delete_field("g", "missing").await);
        assert!(gateway.delete_group("missing").await);
    }

    #[tokio::test]
    async fn test_failures_return_defaults_and_notify() {
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = failures.clone();
        let gateway = HashGateway::new(Arc::new(DownStore)).with_error_handler(Arc::new(
            move |failure: &StoreFailure<'_>| {
                assert!(!failure.method.is_empty());
                counter.fetch_add(1, Ordering::SeqCst);
            },
        ));

        assert!(gateway.get_field("g", "k", false).await.is_none());
        assert!(!gateway
            .set_field("g", "k", &Entry::plain(json!(1)), false)
            .await
            .unwrap());
        assert!(!gateway.delete_field("g", "k").await);
        assert!(gateway.get_all_fields("g", false).await.is_empty());
        assert!(!gateway.delete_group("g").await);

        assert_eq!(failures.load(Ordering::SeqCst), 5);
    }
}
