//! Instrumentation Module
//!
//! Defines the events emitted around hash cache operations and the observer
//! interface that receives them.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

// == Event Names ==
/// Operations reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    WriteHashValue,
    ReadHashValue,
    ReadHash,
    DeleteHashValue,
    DeleteHash,
    Generate,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::WriteHashValue => "write_hash_value",
            EventName::ReadHashValue => "read_hash_value",
            EventName::ReadHash => "read_hash",
            EventName::DeleteHashValue => "delete_hash_value",
            EventName::DeleteHash => "delete_hash",
            EventName::Generate => "generate",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outer operation a read was performed on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperOperation {
    Fetch,
}

// == Cache Event ==
/// Payload delivered to observers once an operation completes.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEvent {
    pub name: EventName,
    /// Normalized group key
    pub prefix: String,
    /// Field key, absent for whole-group events
    pub key: Option<String>,
    /// Hit or miss, only for reads
    pub hit: Option<bool>,
    pub super_operation: Option<SuperOperation>,
    pub duration: Duration,
}

// == Observer ==
/// Receives every event the cache emits.
pub trait CacheObserver: Send + Sync {
    fn on_event(&self, event: &CacheEvent);
}

// == Instrumentation ==
/// Fan-out of events to the registered observers.
#[derive(Clone, Default)]
pub struct Instrumentation {
    observers: Vec<Arc<dyn CacheObserver>>,
}

impl Instrumentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn CacheObserver>) {
        self.observers.push(observer);
    }

    /// Starts timing an operation. The event is emitted when the guard drops,
    /// so early returns are reported too.
    pub fn start(&self, name: EventName, prefix: &str, key: Option<&str>) -> EventGuard<'_> {
        EventGuard {
            instrumentation: self,
            started: Instant::now(),
            event: CacheEvent {
                name,
                prefix: prefix.to_string(),
                key: key.map(str::to_string),
                hit: None,
                super_operation: None,
                duration: Duration::ZERO,
            },
        }
    }

    fn emit(&self, event: &CacheEvent) {
        debug!(
            event = %event.name,
            prefix = %event.prefix,
            key = event.key.as_deref().unwrap_or(""),
            hit = ?event.hit,
            duration_us = event.duration.as_micros() as u64,
            "cache event"
        );
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

impl fmt::Debug for Instrumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumentation")
            .field("observers", &self.observers.len())
            .finish()
    }
}

// == Event Guard ==
/// An in-flight event; payload fields can be filled in before it drops.
pub struct EventGuard<'a> {
    instrumentation: &'a Instrumentation,
    started: Instant,
    event: CacheEvent,
}

impl EventGuard<'_> {
    pub fn hit(&mut self, hit: bool) {
        self.event.hit = Some(hit);
    }

    pub fn super_operation(&mut self, op: SuperOperation) {
        self.event.super_operation = Some(op);
    }
}

impl Drop for EventGuard<'_> {
    fn drop(&mut self) {
        self.event.duration = self.started.elapsed();
        self.instrumentation.emit(&self.event);
    }
}
