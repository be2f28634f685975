//! Request and Response models for the hash cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_key, ReadQuery, WriteFieldRequest, MAX_KEY_LENGTH};
pub use responses::{
    FieldResponse, GroupResponse, HealthResponse, MutationResponse, StatsResponse,
};
