//! Integration Tests for the Hash Cache
//!
//! Exercises the facade end to end over the in-memory store and over a
//! store that fails every command.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use hash_cache::cache::{codec_for, StoreFailure};
use hash_cache::error::StoreResult;
use hash_cache::{HashCache, HashCacheOptions, HashStore, MemoryHashStore, StoreError};

// == Helper Functions ==

fn opts() -> HashCacheOptions {
    HashCacheOptions::new()
}

fn memory_cache() -> (HashCache, Arc<MemoryHashStore>) {
    let store = Arc::new(MemoryHashStore::new());
    (HashCache::new(store.clone()), store)
}

/// Store whose every command fails as if Redis were down.
struct UnreachableStore;

fn refused<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl HashStore for UnreachableStore {
    async fn hget(&self, _: &str, _: &str) -> StoreResult<Option<String>> {
        refused()
    }
    async fn hset(&self, _: &str, _: &str, _: String) -> StoreResult<()> {
        refused()
    }
    async fn hgetall(&self, _: &str) -> StoreResult<HashMap<String, String>> {
        refused()
    }
    async fn hdel(&self, _: &str, _: &str) -> StoreResult<bool> {
        refused()
    }
    async fn del(&self, _: &str) -> StoreResult<bool> {
        refused()
    }
}

// == Fetch ==

#[tokio::test]
async fn test_fetch_generates_then_hits() {
    let (cache, _) = memory_cache();
    let calls = AtomicUsize::new(0);

    let first = cache
        .fetch_field("p", "k", &opts(), |_| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Some("computed".to_string())
        })
        .await
        .unwrap();
    assert_eq!(first.as_deref(), Some("computed"));

    let second = cache
        .fetch_field("p", "k", &opts(), |_| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Some("recomputed".to_string())
        })
        .await
        .unwrap();
    assert_eq!(second.as_deref(), Some("computed"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let plain: Option<String> = cache.fetch_cached_field("p", "k", &opts()).await.unwrap();
    assert_eq!(plain.as_deref(), Some("computed"));
}

#[tokio::test]
async fn test_fetch_passes_field_key_to_block() {
    let (cache, _) = memory_cache();

    let value = cache
        .fetch_field("p", "user:7", &opts(), |key| async move { Some(format!("for {}", key)) })
        .await
        .unwrap();
    assert_eq!(value.as_deref(), Some("for user:7"));
}

#[tokio::test]
async fn test_skip_nil_writes_nothing() {
    let (cache, store) = memory_cache();

    let value: Option<String> = cache
        .fetch_field("p", "k", &opts().skip_nil(true), |_| async { None })
        .await
        .unwrap();

    assert!(value.is_none());
    assert!(store.hget("p", "k").await.unwrap().is_none());
}

#[tokio::test]
async fn test_nil_without_skip_nil_is_cached() {
    let (cache, store) = memory_cache();

    let value: Option<String> = cache
        .fetch_field("p", "k", &opts(), |_| async { None })
        .await
        .unwrap();

    assert!(value.is_none());
    assert!(store.hget("p", "k").await.unwrap().is_some());
}

// == Race Condition Window ==

#[tokio::test]
async fn test_race_window_extends_recently_expired_entry() {
    let (cache, store) = memory_cache();
    cache
        .write_field("p", "k", "stale", &opts().expires_in(TimeDelta::seconds(-3)))
        .await
        .unwrap();

    let race = opts().race_condition_ttl(TimeDelta::seconds(10));
    let observer = store.clone();
    let value = cache
        .fetch_field("p", "k", &race, |_| async move {
            // while this caller recomputes, other readers see the extended entry
            let payload = observer.hget("p", "k").await.unwrap();
            let entry = codec_for(false).deserialize(payload.as_deref()).unwrap();
            assert_eq!(entry.value(), "stale");
            assert!(!entry.is_expired());

            let remaining = entry.expires_at().unwrap() - Utc::now();
            assert!(remaining > TimeDelta::seconds(9));
            assert!(remaining <= TimeDelta::seconds(10));

            Some("fresh".to_string())
        })
        .await
        .unwrap();

    assert_eq!(value.as_deref(), Some("fresh"));
    let stored: Option<String> = cache.read_field("p", "k", &opts()).await.unwrap();
    assert_eq!(stored.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_race_window_elapsed_deletes_entry() {
    let (cache, store) = memory_cache();
    cache
        .write_field("p", "k", "stale", &opts().expires_in(TimeDelta::seconds(-20)))
        .await
        .unwrap();

    let race = opts().race_condition_ttl(TimeDelta::seconds(10));
    let observer = store.clone();
    let value = cache
        .fetch_field("p", "k", &race, |_| async move {
            assert!(observer.hget("p", "k").await.unwrap().is_none());
            Some("fresh".to_string())
        })
        .await
        .unwrap();

    assert_eq!(value.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_expired_without_race_ttl_is_deleted() {
    let (cache, store) = memory_cache();
    cache
        .write_field("p", "k", "stale", &opts().expires_in(TimeDelta::seconds(-1)))
        .await
        .unwrap();

    let observer = store.clone();
    let value = cache
        .fetch_field("p", "k", &opts().skip_nil(true), |_| async move {
            assert!(observer.hget("p", "k").await.unwrap().is_none());
            None::<String>
        })
        .await
        .unwrap();

    assert!(value.is_none());
    assert!(store.hget("p", "k").await.unwrap().is_none());
}

// == Groups ==

#[tokio::test]
async fn test_group_read_returns_all_fields() {
    let (cache, _) = memory_cache();
    cache.write_field("p", "a", &1, &opts()).await.unwrap();
    cache.write_field("p", "b", &2, &opts()).await.unwrap();

    let group: HashMap<String, i64> = cache.read_group("p", &opts()).await.unwrap();

    assert_eq!(group, HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]));
}

#[tokio::test]
async fn test_group_read_drops_expired_fields() {
    let (cache, store) = memory_cache();
    cache.write_field("p", "a", &1, &opts()).await.unwrap();
    cache
        .write_field("p", "b", &2, &opts().expires_in(TimeDelta::seconds(-1)))
        .await
        .unwrap();

    let group: HashMap<String, i64> = cache.read_group("p", &opts()).await.unwrap();
    assert_eq!(group, HashMap::from([("a".to_string(), 1)]));
    assert!(store.hget("p", "b").await.unwrap().is_none());

    let again: HashMap<String, i64> = cache.read_group("p", &opts()).await.unwrap();
    assert_eq!(again.len(), 1);
}

#[tokio::test]
async fn test_group_read_ignores_version() {
    let (cache, _) = memory_cache();
    cache.write_field("p", "a", &1, &opts().version("v1")).await.unwrap();

    let group: HashMap<String, i64> = cache.read_group("p", &opts().version("v2")).await.unwrap();
    assert_eq!(group.get("a"), Some(&1));
}

#[tokio::test]
async fn test_delete_group_removes_every_field() {
    let (cache, store) = memory_cache();
    cache.write_field("p", "a", &1, &opts()).await.unwrap();
    cache.write_field("p", "b", &2, &opts()).await.unwrap();

    assert!(cache.delete_group("p", &opts()).await);

    let group: HashMap<String, i64> = cache.read_group("p", &opts()).await.unwrap();
    assert!(group.is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_delete_field_is_idempotent() {
    let (cache, _) = memory_cache();
    cache.write_field("p", "a", &1, &opts()).await.unwrap();

    assert!(cache.delete_field("p", "a", &opts()).await);
    assert!(cache.delete_field("p", "a", &opts()).await);

    let value: Option<i64> = cache.read_field("p", "a", &opts()).await.unwrap();
    assert!(value.is_none());
}

// == Store Failure Isolation ==

#[tokio::test]
async fn test_store_failures_never_raise() {
    let failures = Arc::new(AtomicUsize::new(0));
    let counter = failures.clone();
    let cache = HashCache::new(Arc::new(UnreachableStore)).with_error_handler(Arc::new(
        move |_: &StoreFailure<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    ));

    assert!(!cache.write_field("p", "k", "v", &opts()).await.unwrap());
    assert!(!cache.delete_field("p", "k", &opts()).await);
    assert!(!cache.delete_group("p", &opts()).await);

    let value: Option<String> = cache.read_field("p", "k", &opts()).await.unwrap();
    assert!(value.is_none());

    let group: HashMap<String, String> = cache.read_group("p", &opts()).await.unwrap();
    assert!(group.is_empty());

    assert_eq!(failures.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_fetch_recomputes_when_store_is_down() {
    let cache = HashCache::new(Arc::new(UnreachableStore));

    let value = cache
        .fetch_field("p", "k", &opts(), |_| async { Some(7) })
        .await
        .unwrap();

    assert_eq!(value, Some(7));
}
