//! Core Service Layer
//!
//! Shared infrastructure: configuration, authentication, errors, storage
//! and uploads.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod files;
pub mod models;
pub mod router;
pub mod store;
pub mod upload;

// Re-exports for convenience
pub use config::{AppState, ServerConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use router::router;
