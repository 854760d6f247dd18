//! Payloads exchanged on the `/spotify` routes. Timestamps are UTC epoch milliseconds.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::{TimestampMilliSeconds, serde_as};
use utoipa::ToSchema;
use validator::Validate;

use crate::spotify::ACCESS_TOKEN_TTL;

/// Consent URL the client should redirect the user to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorizeResponse {
    /// Spotify consent page URL.
    pub url: String,
    /// Opaque value Spotify echoes back on the redirect; the client compares it.
    pub state: String,
}

/// Body posted by the client once Spotify redirected back with a code.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CallbackRequest {
    /// Authorization code from the redirect query string.
    #[validate(length(min = 1, max = 2048))]
    pub code: String,
}

/// Tokens stored after a successful code exchange, mirrored by the client cache.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkedTokensResponse {
    /// Bearer token for the Web API.
    pub access_token: String,
    /// Long-lived token used to mint new access tokens.
    pub refresh_token: String,
    /// When the access token was issued.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    #[schema(value_type = i64)]
    pub obtained_at: SystemTime,
    /// `obtained_at` plus the one hour token lifetime.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    #[schema(value_type = i64)]
    pub expires_at: SystemTime,
}

impl LinkedTokensResponse {
    /// Tokens issued at `obtained_at`.
    pub fn new(access_token: String, refresh_token: String, obtained_at: SystemTime) -> Self {
        Self {
            access_token,
            refresh_token,
            obtained_at,
            expires_at: obtained_at + ACCESS_TOKEN_TTL,
        }
    }
}

/// Fresh access token minted from the stored refresh token.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    /// Newly minted bearer token.
    pub access_token: String,
    /// When the access token was issued.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    #[schema(value_type = i64)]
    pub obtained_at: SystemTime,
    /// `obtained_at` plus the one hour token lifetime.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    #[schema(value_type = i64)]
    pub expires_at: SystemTime,
}

impl AccessTokenResponse {
    /// Access token issued at `obtained_at`.
    pub fn new(access_token: String, obtained_at: SystemTime) -> Self {
        Self {
            access_token,
            obtained_at,
            expires_at: obtained_at + ACCESS_TOKEN_TTL,
        }
    }
}

/// Outcome of a connection verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectionStatusResponse {
    /// Whether the account still holds a usable link.
    pub connected: bool,
    /// Present when connected: whether a refresh ran during this verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refreshed: Option<bool>,
}

impl ConnectionStatusResponse {
    /// Link verified against Spotify.
    pub fn connected(refreshed: bool) -> Self {
        Self {
            connected: true,
            refreshed: Some(refreshed),
        }
    }

    /// No usable link, either never set or just cleared.
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            refreshed: None,
        }
    }
}

/// Result of an explicit disconnect.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DisconnectResponse {
    /// Always `true` once the link is cleared.
    pub success: bool,
}
