//! Entry Codec Module
//!
//! Converts entries to and from the string stored in a hash field. The raw
//! codec stores only the value; the structured codec stores the full
//! envelope as one JSON document.

use serde_json::Value;

use crate::cache::Entry;
use crate::error::Result;

// == Codec Trait ==
/// Serialization strategy for a hash field payload.
pub trait EntryCodec: Send + Sync {
    /// Encodes an entry into the field payload.
    fn serialize(&self, entry: &Entry) -> Result<String>;

    /// Decodes a field payload. `None` input (field missing) yields `None`,
    /// as does a payload that cannot be decoded.
    fn deserialize(&self, payload: Option<&str>) -> Option<Entry>;
}

/// Stores the value's plain string form with no metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

/// Stores value, expiry and version together.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredCodec;

static RAW: RawCodec = RawCodec;
static STRUCTURED: StructuredCodec = StructuredCodec;

/// Picks the codec for the `raw` option.
pub fn codec_for(raw: bool) -> &'static dyn EntryCodec {
    if raw {
        &RAW
    } else {
        &STRUCTURED
    }
}

impl EntryCodec for RawCodec {
    fn serialize(&self, entry: &Entry) -> Result<String> {
        Ok(match entry.value() {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    fn deserialize(&self, payload: Option<&str>) -> Option<Entry> {
        payload.map(|raw| Entry::plain(Value::String(raw.to_string())))
    }
}

impl EntryCodec for StructuredCodec {
    fn serialize(&self, entry: &Entry) -> Result<String> {
        Ok(serde_json::to_string(entry)?)
    }

    fn deserialize(&self, payload: Option<&str>) -> Option<Entry> {
        let payload = payload?;
        match serde_json::from_str(payload) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }
}
