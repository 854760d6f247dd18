//! Minting a new access token from the stored refresh token.

use std::time::SystemTime;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{account_store::AccountStore, models::AccountEntity},
    dto::spotify::AccessTokenResponse,
    error::ServiceError,
    services::{
        disconnect::clear_link,
        token_store::{load_account, save_account},
    },
    spotify::SpotifyApi,
    state::SharedState,
};

/// Result of a single refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New access token, already persisted.
    Refreshed {
        /// Token now stored on the account.
        access_token: String,
        /// Issue instant recorded with it.
        obtained_at: SystemTime,
    },
    /// Spotify refused the refresh token, or none was stored. The account was not touched.
    Rejected,
}

/// Exchange the stored refresh token for a new access token.
///
/// On success only the access token and its issue instant change; the stored
/// refresh token is kept even when Spotify sends a rotated one. A rejection is
/// reported as [`RefreshOutcome::Rejected`] without mutating the account, and a
/// transient failure as [`ServiceError::UpstreamUnavailable`]. Never retries.
pub async fn refresh_access_token(
    spotify: &dyn SpotifyApi,
    store: &dyn AccountStore,
    account: &mut AccountEntity,
    now: SystemTime,
) -> Result<RefreshOutcome, ServiceError> {
    let account_id = account.id;
    let Some(refresh_token) = account.spotify.refresh_token.clone() else {
        warn!(%account_id, "no spotify refresh token stored");
        return Ok(RefreshOutcome::Rejected);
    };

    match spotify.refresh_access_token(refresh_token).await {
        Ok(grant) => {
            if grant.refresh_token.is_some() {
                debug!(%account_id, "spotify sent a rotated refresh token; keeping the stored one");
            }
            account
                .spotify
                .replace_access_token(grant.access_token.clone(), now);
            save_account(store, account).await?;
            debug!(%account_id, "spotify access token refreshed");
            Ok(RefreshOutcome::Refreshed {
                access_token: grant.access_token,
                obtained_at: now,
            })
        }
        Err(err) if err.is_rejection() => {
            warn!(
                %account_id,
                error = %err,
                upstream = ?err.upstream_body(),
                "spotify rejected the refresh token"
            );
            Ok(RefreshOutcome::Rejected)
        }
        Err(err) => {
            warn!(
                %account_id,
                error = %err,
                upstream = ?err.upstream_body(),
                "spotify refresh failed"
            );
            Err(ServiceError::UpstreamUnavailable)
        }
    }
}

/// Refresh on explicit request. A rejected refresh token disconnects the account.
pub async fn refresh_token(
    state: &SharedState,
    account_id: Uuid,
) -> Result<AccessTokenResponse, ServiceError> {
    refresh_token_at(state, account_id, SystemTime::now()).await
}

pub(crate) async fn refresh_token_at(
    state: &SharedState,
    account_id: Uuid,
    now: SystemTime,
) -> Result<AccessTokenResponse, ServiceError> {
    let store = state.require_account_store().await?;
    let mut account = load_account(store.as_ref(), account_id).await?;
    if !account.spotify.connected {
        return Err(ServiceError::InvalidState(
            "spotify account is not connected".into(),
        ));
    }

    match refresh_access_token(state.spotify(), store.as_ref(), &mut account, now).await? {
        RefreshOutcome::Refreshed {
            access_token,
            obtained_at,
        } => Ok(AccessTokenResponse::new(access_token, obtained_at)),
        RefreshOutcome::Rejected => {
            clear_link(store.as_ref(), &mut account).await?;
            info!(%account_id, "spotify link dropped after refresh rejection");
            Err(ServiceError::RefreshFailed)
        }
    }
}
