//! Wire payloads of the Spotify accounts service and Web API.

use serde::Deserialize;

use super::{SpotifyProfile, TokenGrant};

/// Successful `POST /api/token` body.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Issued bearer token.
    pub access_token: String,
    /// Present on the code grant, occasionally on the refresh grant.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl From<TokenResponse> for TokenGrant {
    fn from(value: TokenResponse) -> Self {
        Self {
            access_token: value.access_token,
            refresh_token: value.refresh_token.filter(|token| !token.is_empty()),
            expires_in: value.expires_in,
        }
    }
}

/// OAuth error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub struct OAuthErrorBody {
    /// OAuth error code such as `invalid_grant`.
    pub error: String,
    /// Human readable detail.
    #[serde(default)]
    pub error_description: Option<String>,
}

/// `GET /v1/me` body.
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    /// Spotify user id.
    pub id: String,
    /// Profile display name, unset for some accounts.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<ProfileResponse> for SpotifyProfile {
    fn from(value: ProfileResponse) -> Self {
        Self {
            id: value.id,
            display_name: value.display_name,
        }
    }
}
