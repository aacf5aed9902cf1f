//! Image hosting backend service

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

/// Database pool, models and queries
pub mod db;

/// Upload slot / confirmation / deletion service
pub mod images;

/// JWT token management
pub mod jwt;

/// Object storage operations
pub mod media_storage;

/// Request middleware
pub mod middleware;

/// Password hashing
pub mod password;

/// Route handlers
pub mod routes;

/// Server setup and lifecycle
pub mod server;

/// Application state
pub mod state;

/// Shared types: configuration, errors, extractors
pub mod types;
