//! Cache Entry Module
//!
//! Defines the envelope stored in each hash field: the value plus its
//! expiration timestamp and version tag.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Entry ==
/// A single cached value with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The stored value
    #[serde(rename = "v")]
    value: Value,
    /// Absolute expiration time, None = no expiration
    #[serde(rename = "e", default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    /// Version tag used for invalidation independent of expiry
    #[serde(rename = "ver", default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry.
    pub fn new(value: Value, expires_at: Option<DateTime<Utc>>, version: Option<String>) -> Self {
        Self {
            value,
            expires_at,
            version,
        }
    }

    /// Wraps a value with no expiry and no version.
    pub fn plain(value: Value) -> Self {
        Self::new(value, None, None)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration time.
    /// Entries without an expiration never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Same as [`Entry::is_expired`] against an explicit clock reading.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Expired For ==
    /// Returns how long ago the entry expired, or None if it has not.
    pub fn expired_for(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.expires_at
            .filter(|expires| now >= *expires)
            .map(|expires| now - expires)
    }

    // == Version Mismatch ==
    /// True when both the caller and the entry carry a version and they differ.
    pub fn is_mismatched(&self, version: Option<&str>) -> bool {
        match (version, self.version.as_deref()) {
            (Some(expected), Some(stored)) => expected != stored,
            _ => false,
        }
    }

    // == Extend Expiry ==
    /// Pushes the expiration forward. Used only by the race-condition path.
    pub fn extend_expiry(&mut self, expires_at: DateTime<Utc>) {
        self.expires_at = Some(expires_at);
    }
}
