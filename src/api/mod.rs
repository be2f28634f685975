//! API Module
//!
//! HTTP handlers and routing exposing the hash cache.
//!
//! # Endpoints
//! - `PUT /hash/:prefix/:key` - Write a field
//! - `GET /hash/:prefix/:key` - Read a field
//! - `DELETE /hash/:prefix/:key` - Delete a field
//! - `GET /hash/:prefix` - Read a group
//! - `DELETE /hash/:prefix` - Delete a group
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
