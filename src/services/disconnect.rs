use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        account_store::AccountStore,
        models::{AccountEntity, SpotifyLinkEntity},
    },
    dto::spotify::DisconnectResponse,
    error::ServiceError,
    services::token_store::{load_account, save_account},
    state::SharedState,
};

/// Forget the Spotify link of an account. Safe to call when already disconnected.
pub async fn disconnect(
    state: &SharedState,
    account_id: Uuid,
) -> Result<DisconnectResponse, ServiceError> {
    let store = state.require_account_store().await?;
    let mut account = load_account(store.as_ref(), account_id).await?;
    clear_link(store.as_ref(), &mut account).await?;
    Ok(DisconnectResponse { success: true })
}

/// Reset every token field to its cleared default and persist, even if nothing changed.
pub async fn clear_link(
    store: &dyn AccountStore,
    account: &mut AccountEntity,
) -> Result<(), ServiceError> {
    account.spotify = SpotifyLinkEntity::default();
    save_account(store, account).await?;
    info!(account_id = %account.id, "spotify link cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::test_support::{
        FakeSpotify, RecordingStore, linked_account, test_state, unlinked_account,
    };

    #[tokio::test]
    async fn disconnect_clears_all_token_fields_in_one_write() {
        let spotify = FakeSpotify::default();
        let store = RecordingStore::default();
        let account = linked_account(SystemTime::now());
        store.seed(account.clone());
        let state = test_state(&spotify, &store).await;

        let response = disconnect(&state, account.id).await.unwrap();

        assert!(response.success);
        let saves = store.saves();
        assert_eq!(saves.len(), 1);
        assert!(saves[0].spotify.is_cleared());
        let stored = store.account(account.id);
        assert!(stored.spotify.is_cleared());
        assert_eq!(stored.email, account.email);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent_and_still_writes() {
        let spotify = FakeSpotify::default();
        let store = RecordingStore::default();
        let account = unlinked_account();
        store.seed(account.clone());
        let state = test_state(&spotify, &store).await;

        assert!(disconnect(&state, account.id).await.unwrap().success);
        assert!(disconnect(&state, account.id).await.unwrap().success);

        assert_eq!(store.saves().len(), 2);
        assert!(store.account(account.id).spotify.is_cleared());
    }

    #[tokio::test]
    async fn disconnect_propagates_storage_failure() {
        let spotify = FakeSpotify::default();
        let store = RecordingStore::default();
        let account = linked_account(SystemTime::now());
        store.seed(account.clone());
        store.fail_writes(true);
        let state = test_state(&spotify, &store).await;

        let err = disconnect(&state, account.id).await.unwrap_err();

        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(store.account(account.id), account);
    }
}
