//! Library crate for spotiquiz-back, exposing modules for binaries and integration tests.

/// Client-side helpers for the `/spotify` routes.
pub mod client;
/// Application configuration.
pub mod config;
/// Persistence layer.
pub mod dao;
/// Wire payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Business logic.
pub mod services;
/// Spotify accounts service and Web API client.
pub mod spotify;
/// Shared application state.
pub mod state;

#[cfg(test)]
mod test_support;
