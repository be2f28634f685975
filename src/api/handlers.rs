//! API Handlers
//!
//! HTTP request handlers exposing the hash cache.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{HashCache, HashCacheOptions, StatsRecorder, StoreFailure};
use crate::config::Config;
use crate::error::{HashCacheError, Result, StoreResult};
use crate::models::{
    validate_key, FieldResponse, GroupResponse, HealthResponse, MutationResponse, ReadQuery,
    StatsResponse, WriteFieldRequest,
};
use crate::store::{HashStore, MemoryHashStore, RedisHashStore};

/// Application state shared across all handlers.
///
/// The cache reports every event and every swallowed store failure to
/// `stats`.
#[derive(Clone)]
pub struct AppState {
    pub cache: HashCache,
    pub stats: Arc<StatsRecorder>,
}

impl AppState {
    /// Creates a new AppState over the given store.
    pub fn new(store: Arc<dyn HashStore>, defaults: HashCacheOptions) -> Self {
        let stats = Arc::new(StatsRecorder::new());
        let failures = stats.clone();
        let cache = HashCache::new(store)
            .with_defaults(defaults)
            .with_observer(stats.clone())
            .with_error_handler(Arc::new(move |_: &StoreFailure<'_>| {
                failures.record_store_failure()
            }));

        Self { cache, stats }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Connects to Redis when a URL is configured, otherwise keeps the cache
    /// in process memory.
    pub async fn from_config(config: &Config) -> StoreResult<Self> {
        let store: Arc<dyn HashStore> = match &config.redis_url {
            Some(url) => Arc::new(RedisHashStore::connect(url, config.redis_pool_size).await?),
            None => Arc::new(MemoryHashStore::new()),
        };
        Ok(Self::new(store, config.cache_defaults()))
    }
}

fn check_keys(prefix: &str, key: Option<&str>) -> Result<()> {
    if let Some(msg) = validate_key("Group key", prefix) {
        return Err(HashCacheError::InvalidRequest(msg));
    }
    if let Some(msg) = key.and_then(|k| validate_key("Field key", k)) {
        return Err(HashCacheError::InvalidRequest(msg));
    }
    Ok(())
}

/// Handler for PUT /hash/:prefix/:key
pub async fn write_field_handler(
    State(state): State<AppState>,
    Path((prefix, key)): Path<(String, String)>,
    Json(req): Json<WriteFieldRequest>,
) -> Result<Json<MutationResponse>> {
    check_keys(&prefix, Some(key.as_str()))?;
    let options = req.options()?;

    let stored = state
        .cache
        .write_field(&prefix, &key, &req.value, &options)
        .await?;

    Ok(Json(MutationResponse::written(prefix, key, stored)))
}

/// Handler for GET /hash/:prefix/:key
pub async fn read_field_handler(
    State(state): State<AppState>,
    Path((prefix, key)): Path<(String, String)>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<FieldResponse>> {
    check_keys(&prefix, Some(key.as_str()))?;

    let value: Option<Value> = state
        .cache
        .read_field(&prefix, &key, &query.options())
        .await?;

    match value {
        Some(value) => Ok(Json(FieldResponse::new(prefix, key, value))),
        None => Err(HashCacheError::NotFound(format!("{}/{}", prefix, key))),
    }
}

/// Handler for DELETE /hash/:prefix/:key
pub async fn delete_field_handler(
    State(state): State<AppState>,
    Path((prefix, key)): Path<(String, String)>,
) -> Result<Json<MutationResponse>> {
    check_keys(&prefix, Some(key.as_str()))?;

    let stored = state
        .cache
        .delete_field(&prefix, &key, &HashCacheOptions::default())
        .await;

    Ok(Json(MutationResponse::field_deleted(prefix, key, stored)))
}

/// Handler for GET /hash/:prefix
pub async fn read_group_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<GroupResponse>> {
    check_keys(&prefix, None)?;

    let fields = state.cache.read_group(&prefix, &query.options()).await?;

    Ok(Json(GroupResponse::new(prefix, fields)))
}

/// Handler for DELETE /hash/:prefix
pub async fn delete_group_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Json<MutationResponse>> {
    check_keys(&prefix, None)?;

    let stored = state
        .cache
        .delete_group(&prefix, &HashCacheOptions::default())
        .await;

    Ok(Json(MutationResponse::group_deleted(prefix, stored)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.stats.snapshot()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
