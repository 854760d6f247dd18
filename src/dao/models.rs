use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::{TimestampMilliSeconds, serde_as};
use uuid::Uuid;

/// Application account as persisted by the storage layer.
///
/// Only the fields needed to manage the Spotify link live here; the rest of the
/// user profile belongs to the surrounding application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountEntity {
    /// Stable identifier for the account.
    pub id: Uuid,
    /// Login email, unique across accounts.
    pub email: String,
    /// Spotify link state, cleared defaults when never connected.
    #[serde(default)]
    pub spotify: SpotifyLinkEntity,
}

impl AccountEntity {
    /// Create an account that has never been linked to Spotify.
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            spotify: SpotifyLinkEntity::default(),
        }
    }
}

/// Persisted Spotify credentials of an account.
///
/// `Default` is the disconnected state: every field cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpotifyLinkEntity {
    /// Whether the link is currently considered valid.
    pub connected: bool,
    /// Short-lived bearer credential and the instant it was obtained.
    #[serde(default)]
    pub access_token: AccessTokenEntity,
    /// Long-lived credential used to mint new access tokens.
    pub refresh_token: Option<String>,
    /// Display name cached from the Spotify profile.
    pub username: Option<String>,
}

impl SpotifyLinkEntity {
    /// Link state right after a successful authorization-code exchange.
    pub fn linked(
        access_token: String,
        refresh_token: String,
        username: String,
        obtained_at: SystemTime,
    ) -> Self {
        Self {
            connected: true,
            access_token: AccessTokenEntity::issued(access_token, obtained_at),
            refresh_token: Some(refresh_token),
            username: Some(username),
        }
    }

    /// Access token and its issue instant, only when the link is marked connected
    /// and both halves of the token are present.
    pub fn usable_access_token(&self) -> Option<(&str, SystemTime)> {
        if !self.connected {
            return None;
        }
        self.access_token.current()
    }

    /// Overwrite the access token, leaving the refresh token and username alone.
    pub fn replace_access_token(&mut self, value: String, obtained_at: SystemTime) {
        self.access_token = AccessTokenEntity::issued(value, obtained_at);
    }

    /// True when every token-related field holds its cleared default.
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }
}

/// Access token as stored: value and issue instant are set and cleared together.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenEntity {
    /// Bearer token value.
    pub value: Option<String>,
    /// UTC instant the token was obtained, stored as epoch milliseconds.
    #[serde_as(as = "Option<TimestampMilliSeconds<i64>>")]
    pub obtained_at: Option<SystemTime>,
}

impl AccessTokenEntity {
    /// A token obtained at `obtained_at`.
    pub fn issued(value: String, obtained_at: SystemTime) -> Self {
        Self {
            value: Some(value),
            obtained_at: Some(obtained_at),
        }
    }

    /// Both halves of the token, or `None` if either one is missing.
    pub fn current(&self) -> Option<(&str, SystemTime)> {
        match (&self.value, self.obtained_at) {
            (Some(value), Some(obtained_at)) => Some((value.as_str(), obtained_at)),
            _ => None,
        }
    }
}
