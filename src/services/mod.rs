/// Spotify consent URL construction.
pub mod authorization;
/// In-flight marker for authorization codes.
pub mod callback_guard;
/// Authorization-code exchange and account linking.
pub mod code_exchange;
/// Per-request connection verification state machine.
pub mod connection_verifier;
/// Clearing of the stored Spotify link.
pub mod disconnect;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Storage connection supervisor with backoff.
pub mod storage_supervisor;
/// Access token refresh.
pub mod token_refresh;
/// Account lookups and writes.
pub mod token_store;
