//! Hash Cache Facade
//!
//! Public API over hash-scoped entries: single-field write/read/fetch/delete
//! plus whole-group read and delete. Applies option merging, key and version
//! normalization, expiration and the race-condition policy, then delegates
//! to the gateway.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::events::{CacheObserver, EventName, Instrumentation, SuperOperation};
use crate::cache::gateway::{ErrorHandler, HashGateway};
use crate::cache::{Entry, HashCacheOptions};
use crate::error::{HashCacheError, Result};
use crate::store::HashStore;

// == Hash Cache ==
/// Cache storing entries as fields of store-level hashes.
#[derive(Debug, Clone)]
pub struct HashCache {
    gateway: HashGateway,
    defaults: HashCacheOptions,
    instrumentation: Instrumentation,
}

impl HashCache {
    // == Constructor ==
    /// Creates a cache over the given store with empty defaults.
    pub fn new(store: Arc<dyn HashStore>) -> Self {
        Self {
            gateway: HashGateway::new(store),
            defaults: HashCacheOptions::default(),
            instrumentation: Instrumentation::new(),
        }
    }

    /// Sets the cache-wide options every call is merged over.
    pub fn with_defaults(mut self, defaults: HashCacheOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Registers the callback told about swallowed store failures.
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.gateway = self.gateway.with_error_handler(handler);
        self
    }

    /// Registers an event observer.
    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.instrumentation.subscribe(observer);
        self
    }

    pub fn defaults(&self) -> &HashCacheOptions {
        &self.defaults
    }

    fn merged_options(&self, options: &HashCacheOptions) -> HashCacheOptions {
        self.defaults.merge(options)
    }

    // == Write Field ==
    /// Stores `value` under `key` in the `prefix` group.
    ///
    /// Returns `Ok(false)` when the store could not be reached; only a value
    /// that cannot be serialized is an error.
    pub async fn write_field<T>(
        &self,
        prefix: &str,
        key: &str,
        value: &T,
        options: &HashCacheOptions,
    ) -> Result<bool>
    where
        T: Serialize + ?Sized,
    {
        let options = self.merged_options(options);
        let prefix = options.normalize_key(prefix);
        let value = serde_json::to_value(value)?;
        self.write_entry(&prefix, key, value, &options).await
    }

    async fn write_entry(
        &self,
        prefix: &str,
        key: &str,
        value: Value,
        options: &HashCacheOptions,
    ) -> Result<bool> {
        let _event = self
            .instrumentation
            .start(EventName::WriteHashValue, prefix, Some(key));
        let entry = Entry::new(
            value,
            options.expiration_from(Utc::now())?,
            options.normalized_version(),
        );
        self.gateway
            .set_field(prefix, key, &entry, options.is_raw())
            .await
    }

    // == Read Field ==
    /// Returns the cached value, or None on a miss.
    ///
    /// Expired entries are removed from the store. Entries written with a
    /// different version are left in place but treated as a miss.
    pub async fn read_field<T>(
        &self,
        prefix: &str,
        key: &str,
        options: &HashCacheOptions,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let options = self.merged_options(options);
        let prefix = options.normalize_key(prefix);
        let mut event = self
            .instrumentation
            .start(EventName::ReadHashValue, &prefix, Some(key));

        let entry = self.read_live_entry(&prefix, key, &options).await;
        event.hit(entry.is_some());

        decode_value(entry)
    }

    async fn read_live_entry(
        &self,
        prefix: &str,
        key: &str,
        options: &HashCacheOptions,
    ) -> Option<Entry> {
        let entry = self.gateway.get_field(prefix, key, options.is_raw()).await?;

        if entry.is_expired() {
            self.gateway.delete_field(prefix, key).await;
            return None;
        }
        if entry.is_mismatched(options.normalized_version().as_deref()) {
            return None;
        }
        Some(entry)
    }

    // == Fetch Field ==
    /// Returns the cached value, or computes, stores and returns a fresh one.
    ///
    /// With `force` the cached value is ignored. With `skip_nil` a computed
    /// `None` is not stored. With a positive `race_condition_ttl` an entry
    /// that expired within that window is extended in the store so other
    /// readers keep seeing it while this caller recomputes.
    pub async fn fetch_field<T, F, Fut>(
        &self,
        prefix: &str,
        key: &str,
        options: &HashCacheOptions,
        recompute: F,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let options = self.merged_options(options);
        let prefix = options.normalize_key(prefix);
        let raw = options.is_raw();

        let mut event = self
            .instrumentation
            .start(EventName::ReadHash, &prefix, Some(key));
        event.super_operation(SuperOperation::Fetch);

        let entry = if options.is_force() {
            None
        } else {
            self.gateway.get_field(&prefix, key, raw).await
        };

        let now = Utc::now();
        let cached = match entry {
            Some(stale) if stale.is_expired_at(now) => {
                self.handle_expired_entry(&prefix, key, stale, &options, now)
                    .await?;
                None
            }
            other => other,
        }
        .filter(|entry| !entry.is_mismatched(options.normalized_version().as_deref()));

        event.hit(cached.is_some());
        drop(event);

        if cached.is_some() {
            return decode_value(cached);
        }

        let value = {
            let _generate = self
                .instrumentation
                .start(EventName::Generate, &prefix, Some(key));
            recompute(key.to_string()).await
        };

        if value.is_some() || !options.is_skip_nil() {
            let stored = serde_json::to_value(&value)?;
            self.write_entry(&prefix, key, stored, &options).await?;
        }

        Ok(value)
    }

    /// Fetch without a recomputation block: a plain read, except that
    /// `force` is rejected since there is nothing to recompute with.
    pub async fn fetch_cached_field<T>(
        &self,
        prefix: &str,
        key: &str,
        options: &HashCacheOptions,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        if self.merged_options(options).is_force() {
            return Err(HashCacheError::MissingRecomputeBlock);
        }
        self.read_field(prefix, key, options).await
    }

    // == Race Condition Policy ==
    /// Extends an entry that expired within the race window, deletes it
    /// otherwise. Either way the current caller sees a miss.
    async fn handle_expired_entry(
        &self,
        prefix: &str,
        key: &str,
        mut entry: Entry,
        options: &HashCacheOptions,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let window = options.race_window();
        let within_window = match (window, entry.expired_for(now)) {
            (Some(window), Some(elapsed)) => elapsed <= window,
            _ => false,
        };

        match window {
            Some(window) if within_window => {
                let extended = now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC);
                entry.extend_expiry(extended);
                debug!(prefix, key, "Extending expired entry for race condition window");
                self.gateway
                    .set_field(prefix, key, &entry, options.is_raw())
                    .await?;
            }
            _ => {
                self.gateway.delete_field(prefix, key).await;
            }
        }
        Ok(())
    }

    // == Delete Field ==
    /// Removes one field. Deleting a missing field succeeds; false means the
    /// store could not be reached.
    pub async fn delete_field(&self, prefix: &str, key: &str, options: &HashCacheOptions) -> bool {
        let options = self.merged_options(options);
        let prefix = options.normalize_key(prefix);
        let _event = self
            .instrumentation
            .start(EventName::DeleteHashValue, &prefix, Some(key));

        self.gateway.delete_field(&prefix, key).await
    }

    // == Read Group ==
    /// Returns every live field of the group. Expired fields are deleted and
    /// left out; versions are not checked. Fields whose value does not fit
    /// `T` are logged and left out, like undecodable payloads.
    pub async fn read_group<T>(
        &self,
        prefix: &str,
        options: &HashCacheOptions,
    ) -> Result<HashMap<String, T>>
    where
        T: DeserializeOwned,
    {
        let options = self.merged_options(options);
        let prefix = options.normalize_key(prefix);
        let _event = self.instrumentation.start(EventName::ReadHash, &prefix, None);

        let entries = self.gateway.get_all_fields(&prefix, options.is_raw()).await;
        let mut values = HashMap::with_capacity(entries.len());

        for (key, entry) in entries {
            if entry.is_expired() {
                self.gateway.delete_field(&prefix, &key).await;
                continue;
            }
            match serde_json::from_value(entry.into_value()) {
                Ok(value) => {
                    values.insert(key, value);
                }
                Err(e) => {
                    warn!(prefix = %prefix, key = %key, error = %e, "Skipping group field of unexpected type");
                }
            }
        }

        Ok(values)
    }

    // == Delete Group ==
    /// Removes the whole group in one store command.
    pub async fn delete_group(&self, prefix: &str, options: &HashCacheOptions) -> bool {
        let options = self.merged_options(options);
        let prefix = options.normalize_key(prefix);
        let _event = self.instrumentation.start(EventName::DeleteHash, &prefix, None);

        self.gateway.delete_group(&prefix).await
    }
}

/// Converts a hit into the caller's type. A stored null reads back as None.
fn decode_value<T: DeserializeOwned>(entry: Option<Entry>) -> Result<Option<T>> {
    match entry {
        Some(entry) => Ok(serde_json::from_value::<Option<T>>(entry.into_value())?),
        None => Ok(None),
    }
}
