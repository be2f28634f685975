//! Response DTOs for the hash cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for reading a field (GET /hash/:prefix/:key)
#[derive(Debug, Clone, Serialize)]
pub struct FieldResponse {
    pub prefix: String,
    pub key: String,
    pub value: Value,
}

impl FieldResponse {
    pub fn new(prefix: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            prefix: prefix.into(),
            key: key.into(),
            value,
        }
    }
}

/// Response body for reading a whole group (GET /hash/:prefix)
#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    pub prefix: String,
    pub fields: HashMap<String, Value>,
}

impl GroupResponse {
    pub fn new(prefix: impl Into<String>, fields: HashMap<String, Value>) -> Self {
        Self {
            prefix: prefix.into(),
            fields,
        }
    }
}

/// Response body for writes and deletes
///
/// `stored` is false when the backing store could not be reached.
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    /// Human-readable outcome
    pub message: String,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub stored: bool,
}

impl MutationResponse {
    pub fn written(prefix: impl Into<String>, key: impl Into<String>, stored: bool) -> Self {
        let key = key.into();
        Self {
            message: format!("Field '{}' written", key),
            prefix: prefix.into(),
            key: Some(key),
            stored,
        }
    }

    pub fn field_deleted(prefix: impl Into<String>, key: impl Into<String>, stored: bool) -> Self {
        let key = key.into();
        Self {
            message: format!("Field '{}' deleted", key),
            prefix: prefix.into(),
            key: Some(key),
            stored,
        }
    }

    pub fn group_deleted(prefix: impl Into<String>, stored: bool) -> Self {
        let prefix = prefix.into();
        Self {
            message: format!("Group '{}' deleted", prefix),
            prefix,
            key: None,
            stored,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
