//! Black-box access to the Spotify accounts service and Web API.

/// Consent URL and OAuth `state` generation.
pub mod authorize;
/// HTTP implementation of [`SpotifyApi`].
pub mod client;
/// Classified Spotify failures.
pub mod error;
/// Raw Spotify payloads.
pub mod models;

use std::time::Duration;

use futures::future::BoxFuture;

pub use self::client::HttpSpotifyClient;
pub use self::error::{SpotifyError, SpotifyResult};

/// Lifetime Spotify grants to access tokens. Tokens are treated as stale once
/// they are this old.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Token pair returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    /// Issued bearer token.
    pub access_token: String,
    /// Always present for the authorization-code grant; the refresh grant only
    /// sometimes rotates it.
    pub refresh_token: Option<String>,
    /// Lifetime in seconds as reported by Spotify.
    pub expires_in: Option<u64>,
}

/// Subset of `GET /v1/me` the backend cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyProfile {
    /// Spotify user id.
    pub id: String,
    /// Display name, when the user set one.
    pub display_name: Option<String>,
}

impl SpotifyProfile {
    /// Name shown to the player: display name, or the user id when none is set.
    pub fn username(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

/// Operations consumed from Spotify. Implementations classify every failure into
/// a [`SpotifyError`] so callers never inspect raw HTTP responses.
pub trait SpotifyApi: Send + Sync {
    /// `POST /api/token` with the authorization_code grant.
    fn exchange_code(&self, code: String) -> BoxFuture<'static, SpotifyResult<TokenGrant>>;
    /// `POST /api/token` with the refresh_token grant.
    fn refresh_access_token(
        &self,
        refresh_token: String,
    ) -> BoxFuture<'static, SpotifyResult<TokenGrant>>;
    /// `GET /v1/me`, used both as identity lookup and as token probe.
    fn current_user(&self, access_token: String) -> BoxFuture<'static, SpotifyResult<SpotifyProfile>>;
}
