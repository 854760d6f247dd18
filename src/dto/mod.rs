/// Health check payloads.
pub mod health;
/// Payloads of the `/spotify` routes.
pub mod spotify;
