//! Per-request verification of a stored Spotify link.
//!
//! A verification walks a small state machine:
//!
//! ```text
//! NotConnected                        (no usable token)
//! Fresh  ──probe ok──▶ Verified
//! Stale  ──refresh ok──▶ Fresh ──probe ok──▶ Verified
//! Stale  ──refresh rejected──▶ Invalid (disconnect)
//! Fresh  ──probe 401──▶ Invalid (disconnect)
//! ```
//!
//! Staleness is always decided before the probe, so no probe is spent on a
//! token already expired by policy. Transient Spotify failures abort the
//! verification with a retryable error and leave the account as it was.

use std::time::SystemTime;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dto::spotify::ConnectionStatusResponse,
    error::ServiceError,
    services::{
        disconnect::clear_link,
        token_refresh::{RefreshOutcome, refresh_access_token},
        token_store::load_account,
    },
    spotify::ACCESS_TOKEN_TTL,
    state::SharedState,
};

/// Position of a verification in the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
    /// No usable token stored; nothing to verify.
    NotConnected,
    /// Token age below the TTL.
    Fresh,
    /// Token age at or past the TTL; must be refreshed before use.
    Stale,
    /// Spotify accepted the token.
    Verified,
    /// Spotify refused the token or the refresh; the link gets cleared.
    Invalid,
}

/// `true` once the token is at least [`ACCESS_TOKEN_TTL`] old. A token stamped in
/// the future has age zero.
pub fn is_stale(obtained_at: SystemTime, now: SystemTime) -> bool {
    now.duration_since(obtained_at)
        .is_ok_and(|age| age >= ACCESS_TOKEN_TTL)
}

struct Verification {
    account_id: Uuid,
    state: VerificationState,
    refreshed: bool,
}

impl Verification {
    fn start(account_id: Uuid, state: VerificationState) -> Self {
        debug!(%account_id, state = ?state, "connection verification started");
        Self {
            account_id,
            state,
            refreshed: false,
        }
    }

    fn advance(&mut self, next: VerificationState) {
        debug!(
            account_id = %self.account_id,
            from = ?self.state,
            to = ?next,
            "connection verification transition"
        );
        self.state = next;
    }
}

/// Decide whether the stored link is usable, refreshing or disconnecting as needed.
pub async fn check_connection(
    state: &SharedState,
    account_id: Uuid,
) -> Result<ConnectionStatusResponse, ServiceError> {
    check_connection_at(state, account_id, SystemTime::now()).await
}

pub(crate) async fn check_connection_at(
    state: &SharedState,
    account_id: Uuid,
    now: SystemTime,
) -> Result<ConnectionStatusResponse, ServiceError> {
    let store = state.require_account_store().await?;
    let mut account = load_account(store.as_ref(), account_id).await?;

    let Some((token, obtained_at)) = account.spotify.usable_access_token() else {
        Verification::start(account_id, VerificationState::NotConnected);
        return Ok(ConnectionStatusResponse::disconnected());
    };
    let mut access_token = token.to_owned();

    let initial = if is_stale(obtained_at, now) {
        VerificationState::Stale
    } else {
        VerificationState::Fresh
    };
    let mut verification = Verification::start(account_id, initial);

    if verification.state == VerificationState::Stale {
        match refresh_access_token(state.spotify(), store.as_ref(), &mut account, now).await? {
            RefreshOutcome::Refreshed {
                access_token: refreshed,
                ..
            } => {
                access_token = refreshed;
                verification.refreshed = true;
                verification.advance(VerificationState::Fresh);
            }
            RefreshOutcome::Rejected => {
                verification.advance(VerificationState::Invalid);
                clear_link(store.as_ref(), &mut account).await?;
                return Ok(ConnectionStatusResponse::disconnected());
            }
        }
    }

    match state.spotify().current_user(access_token).await {
        Ok(_) => {
            verification.advance(VerificationState::Verified);
            Ok(ConnectionStatusResponse::connected(verification.refreshed))
        }
        Err(err) if err.is_rejection() => {
            warn!(%account_id, error = %err, "spotify rejected the stored access token");
            verification.advance(VerificationState::Invalid);
            clear_link(store.as_ref(), &mut account).await?;
            Ok(ConnectionStatusResponse::disconnected())
        }
        Err(err) => {
            warn!(
                %account_id,
                error = %err,
                upstream = ?err.upstream_body(),
                "spotify probe failed; keeping the stored link"
            );
            Err(ServiceError::UpstreamUnavailable)
        }
    }
}
