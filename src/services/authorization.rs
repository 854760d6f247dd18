use tracing::error;
use uuid::Uuid;

use crate::{
    dto::spotify::AuthorizeResponse,
    error::ServiceError,
    services::token_store::load_account,
    spotify::authorize::{authorization_url as build_url, generate_state},
    state::SharedState,
};

/// Consent URL for the account plus the `state` value the client should expect back.
pub async fn authorization_url(
    state: &SharedState,
    account_id: Uuid,
) -> Result<AuthorizeResponse, ServiceError> {
    let store = state.require_account_store().await?;
    load_account(store.as_ref(), account_id).await?;

    let oauth_state = generate_state();
    let config = state.config();
    let url = build_url(&config.spotify, &config.credentials, &oauth_state).map_err(|err| {
        error!(error = %err, "failed to build spotify authorization url");
        ServiceError::Misconfigured("spotify authorization url".into())
    })?;

    Ok(AuthorizeResponse {
        url: url.into(),
        state: oauth_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeSpotify, RecordingStore, test_state, unlinked_account};

    #[tokio::test]
    async fn url_embeds_the_returned_state() {
        let spotify = FakeSpotify::default();
        let store = RecordingStore::default();
        let account = unlinked_account();
        store.seed(account.clone());
        let state = test_state(&spotify, &store).await;

        let response = authorization_url(&state, account.id).await.unwrap();

        assert!(response.url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(response.url.contains(&format!("state={}", response.state)));
        assert!(response.url.contains("client_id=client-id"));
    }

    #[tokio::test]
    async fn unknown_account_is_rejected() {
        let spotify = FakeSpotify::default();
        let store = RecordingStore::default();
        let state = test_state(&spotify, &store).await;

        let err = authorization_url(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
