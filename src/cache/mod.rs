//! Cache Module
//!
//! Hash-scoped cache entries with per-field expiration and versioning.

pub mod codec;
mod entry;
pub mod events;
pub mod gateway;
mod hash_cache;
mod options;
mod stats;


// Re-export public types
pub use codec::{codec_for, EntryCodec, RawCodec, StructuredCodec};
pub use entry::Entry;
pub use events::{CacheEvent, CacheObserver, EventName, SuperOperation};
pub use gateway::{ErrorHandler, HashGateway, StoreFailure};
pub use hash_cache::HashCache;
pub use options::HashCacheOptions;
pub use stats::{CacheStats, StatsRecorder};
