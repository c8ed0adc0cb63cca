//! Bot Studio backend service

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Session resolution
pub mod identity;

/// Access token verification
pub mod jwt;

/// Image object storage
pub mod media_storage;

/// Request middleware
pub mod middleware;

/// HTTP routes
pub mod routes;

/// Router assembly and server startup
pub mod server;

/// Shared types: environment, errors, extractors
pub mod types;
