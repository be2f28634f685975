//! Cache Options Module
//!
//! Per-call options, merged field by field over the cache-wide defaults.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{HashCacheError, Result};

// == Hash Cache Options ==
/// Options recognized by the hash cache operations.
///
/// Every field is optional so that a per-call value can be told apart from
/// "not given" when merging over defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashCacheOptions {
    /// Namespace prepended to every group key
    pub namespace: Option<String>,
    /// Relative lifetime; negative values produce an already expired entry
    pub expires_in: Option<TimeDelta>,
    /// Absolute expiration time, ignored when `expires_in` is set
    pub expires_at: Option<DateTime<Utc>>,
    /// Version tag embedded on write and checked on read
    pub version: Option<String>,
    /// Grace period during which an expired entry is extended instead of dropped
    pub race_condition_ttl: Option<TimeDelta>,
    /// Skip the cached value and recompute
    pub force: Option<bool>,
    /// Do not persist a recomputed value that is absent
    pub skip_nil: Option<bool>,
    /// Store the value verbatim with no metadata
    pub raw: Option<bool>,
}

impl HashCacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    // == Builders ==
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn expires_in(mut self, expires_in: TimeDelta) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn race_condition_ttl(mut self, ttl: TimeDelta) -> Self {
        self.race_condition_ttl = Some(ttl);
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }

    pub fn skip_nil(mut self, skip_nil: bool) -> Self {
        self.skip_nil = Some(skip_nil);
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = Some(raw);
        self
    }

    // == Merge ==
    /// Returns `self` with every field set in `overrides` replaced.
    pub fn merge(&self, overrides: &HashCacheOptions) -> HashCacheOptions {
        HashCacheOptions {
            namespace: overrides.namespace.clone().or_else(|| self.namespace.clone()),
            expires_in: overrides.expires_in.or(self.expires_in),
            expires_at: overrides.expires_at.or(self.expires_at),
            version: overrides.version.clone().or_else(|| self.version.clone()),
            race_condition_ttl: overrides.race_condition_ttl.or(self.race_condition_ttl),
            force: overrides.force.or(self.force),
            skip_nil: overrides.skip_nil.or(self.skip_nil),
            raw: overrides.raw.or(self.raw),
        }
    }

    // == Normalization ==
    /// Applies the namespace to a group key.
    pub fn normalize_key(&self, prefix: &str) -> String {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => format!("{}:{}", ns, prefix),
            _ => prefix.to_string(),
        }
    }

    /// Version tag to embed on write or expect on read.
    pub fn normalized_version(&self) -> Option<String> {
        self.version.clone().filter(|v| !v.is_empty())
    }

    /// Absolute expiration for an entry written at `now`.
    ///
    /// Fails when `now + expires_in` falls outside the range `DateTime` can
    /// represent.
    pub fn expiration_from(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        match self.expires_in {
            Some(expires_in) => now.checked_add_signed(expires_in).map(Some).ok_or_else(|| {
                HashCacheError::ExpiryOutOfRange(format!(
                    "expires_in of {}s",
                    expires_in.num_seconds()
                ))
            }),
            None => Ok(self.expires_at),
        }
    }

    /// Race-condition window, only when strictly positive.
    pub fn race_window(&self) -> Option<TimeDelta> {
        self.race_condition_ttl.filter(|ttl| *ttl > TimeDelta::zero())
    }

    pub fn is_force(&self) -> bool {
        self.force.unwrap_or(false)
    }

    pub fn is_skip_nil(&self) -> bool {
        self.skip_nil.unwrap_or(false)
    }

    pub fn is_raw(&self) -> bool {
        self.raw.unwrap_or(false)
    }
}
