//! Client-side mirror of the tokens handed out by the backend.
//!
//! The cache is advisory: it saves the client a verification round trip while the
//! mirrored access token is young, but the server record stays authoritative and
//! every privileged call is still checked against it.

use std::time::SystemTime;

use crate::{
    dto::spotify::{AccessTokenResponse, ConnectionStatusResponse, LinkedTokensResponse},
    spotify::ACCESS_TOKEN_TTL,
};

/// Contents of the single cache slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedTokens {
    /// Mirrored bearer token.
    pub access_token: String,
    /// Unknown when the slot was filled from a bare refresh response.
    pub refresh_token: Option<String>,
    /// `received_at + ACCESS_TOKEN_TTL`, computed locally.
    pub expiry_time: SystemTime,
}

/// Single-slot token cache.
#[derive(Debug, Default)]
pub struct ClientTokenCache {
    slot: Option<CachedTokens>,
}

impl ClientTokenCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot with tokens received at `received_at`.
    pub fn store(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        received_at: SystemTime,
    ) {
        self.slot = Some(CachedTokens {
            access_token: access_token.into(),
            refresh_token,
            expiry_time: received_at + ACCESS_TOKEN_TTL,
        });
    }

    /// Mirror the tokens returned by a successful code exchange.
    pub fn store_linked(&mut self, tokens: &LinkedTokensResponse) {
        self.store(
            tokens.access_token.clone(),
            Some(tokens.refresh_token.clone()),
            tokens.obtained_at,
        );
    }

    /// Swap in a refreshed access token, keeping any cached refresh token.
    pub fn update_access_token(&mut self, token: &AccessTokenResponse) {
        let refresh_token = self
            .slot
            .take()
            .and_then(|cached| cached.refresh_token);
        self.store(token.access_token.clone(), refresh_token, token.obtained_at);
    }

    /// Current slot contents, expired or not.
    pub fn tokens(&self) -> Option<&CachedTokens> {
        self.slot.as_ref()
    }

    /// Cached access token, only while it has not reached its expiry.
    pub fn access_token(&self, now: SystemTime) -> Option<&str> {
        self.slot
            .as_ref()
            .filter(|cached| now < cached.expiry_time)
            .map(|cached| cached.access_token.as_str())
    }

    /// `true` while the cached access token is usable.
    pub fn is_fresh(&self, now: SystemTime) -> bool {
        self.access_token(now).is_some()
    }

    /// Whether the client should ask the backend to verify the link.
    pub fn needs_verification(&self, now: SystemTime) -> bool {
        !self.is_fresh(now)
    }

    /// Drop the mirror when the backend reports the link as gone.
    pub fn reconcile(&mut self, status: &ConnectionStatusResponse) {
        if !status.connected {
            self.clear();
        }
    }

    /// Empty the slot.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}
