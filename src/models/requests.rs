//! Request DTOs for the hash cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use chrono::TimeDelta;
use serde::Deserialize;
use serde_json::Value;

use crate::cache::HashCacheOptions;
use crate::error::{HashCacheError, Result};

/// Maximum allowed group or field key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for writing a field (PUT /hash/:prefix/:key)
///
/// # Fields
/// - `value`: Any JSON value to store
/// - `expires_in`: Optional lifetime in seconds, negative values store an expired entry
/// - `version`: Optional version tag
/// - `raw`: Store the value without metadata
#[derive(Debug, Clone, Deserialize)]
pub struct WriteFieldRequest {
    pub value: Value,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub raw: Option<bool>,
}

impl WriteFieldRequest {
    /// Per-call options carried by the request.
    ///
    /// Rejects an `expires_in` too large to be a duration.
    pub fn options(&self) -> Result<HashCacheOptions> {
        let expires_in = match self.expires_in {
            Some(secs) => Some(TimeDelta::try_seconds(secs).ok_or_else(|| {
                HashCacheError::InvalidRequest(format!("expires_in of {}s is out of range", secs))
            })?),
            None => None,
        };

        Ok(HashCacheOptions {
            expires_in,
            version: self.version.clone(),
            raw: self.raw,
            ..HashCacheOptions::default()
        })
    }
}

/// Query string for reads (`?version=..&raw=..`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadQuery {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub raw: Option<bool>,
}

impl ReadQuery {
    pub fn options(&self) -> HashCacheOptions {
        HashCacheOptions {
            version: self.version.clone(),
            raw: self.raw,
            ..HashCacheOptions::default()
        }
    }
}

/// Validates a group or field key from the URL path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(kind: &str, key: &str) -> Option<String> {
    if key.is_empty() {
        return Some(format!("{} cannot be empty", kind));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "{} exceeds maximum length of {} characters",
            kind, MAX_KEY_LENGTH
        ));
    }
    None
}
