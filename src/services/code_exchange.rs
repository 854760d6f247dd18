use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        account_store::AccountStore,
        models::{AccountEntity, SpotifyLinkEntity},
    },
    dto::spotify::LinkedTokensResponse,
    error::ServiceError,
    services::{
        disconnect::clear_link,
        token_store::{load_account, save_account},
    },
    state::SharedState,
};

/// Trade a one-time authorization code for tokens and link the account.
///
/// The code is marked in flight for the whole exchange so a replayed callback is
/// refused before it reaches Spotify. A rejected code leaves the account untouched;
/// any other failure past the code exchange clears the link before reporting
/// [`ServiceError::UpstreamUnavailable`].
pub async fn exchange_authorization_code(
    state: &SharedState,
    account_id: Uuid,
    code: String,
) -> Result<LinkedTokensResponse, ServiceError> {
    exchange_authorization_code_at(state, account_id, code, SystemTime::now()).await
}

pub(crate) async fn exchange_authorization_code_at(
    state: &SharedState,
    account_id: Uuid,
    code: String,
    now: SystemTime,
) -> Result<LinkedTokensResponse, ServiceError> {
    if code.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "authorization code must not be blank".into(),
        ));
    }
    let _in_flight = state.callback_guard().begin(&code)?;
    let store = state.require_account_store().await?;
    let mut account = load_account(store.as_ref(), account_id).await?;

    let grant = match state.spotify().exchange_code(code).await {
        Ok(grant) => grant,
        Err(err) if err.is_rejection() => {
            warn!(
                %account_id,
                error = %err,
                upstream = ?err.upstream_body(),
                "spotify rejected the authorization code"
            );
            return Err(ServiceError::InvalidGrant);
        }
        Err(err) => {
            warn!(
                %account_id,
                error = %err,
                upstream = ?err.upstream_body(),
                "spotify code exchange failed"
            );
            return Err(reset_link(store.as_ref(), &mut account).await);
        }
    };

    let Some(refresh_token) = grant.refresh_token else {
        warn!(%account_id, "spotify token response carried no refresh token");
        return Err(reset_link(store.as_ref(), &mut account).await);
    };

    let profile = match state.spotify().current_user(grant.access_token.clone()).await {
        Ok(profile) => profile,
        Err(err) => {
            warn!(
                %account_id,
                error = %err,
                upstream = ?err.upstream_body(),
                "spotify profile lookup failed after code exchange"
            );
            return Err(reset_link(store.as_ref(), &mut account).await);
        }
    };

    account.spotify = SpotifyLinkEntity::linked(
        grant.access_token.clone(),
        refresh_token.clone(),
        profile.username().to_owned(),
        now,
    );
    save_account(store.as_ref(), &account).await?;
    info!(%account_id, username = %profile.username(), "spotify account linked");

    Ok(LinkedTokensResponse::new(
        grant.access_token,
        refresh_token,
        now,
    ))
}

/// Safety reset after a half-completed exchange.
async fn reset_link(store: &dyn AccountStore, account: &mut AccountEntity) -> ServiceError {
    match clear_link(store, account).await {
        Ok(()) => ServiceError::UpstreamUnavailable,
        Err(err) => err,
    }
}
