use uuid::Uuid;

use crate::{
    dao::{account_store::AccountStore, models::AccountEntity},
    error::ServiceError,
};

/// Load the account owning the Spotify link, failing when it does not exist.
pub async fn load_account(
    store: &dyn AccountStore,
    account_id: Uuid,
) -> Result<AccountEntity, ServiceError> {
    store
        .find_account(account_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("account `{account_id}` not found")))
}

/// Persist the whole account in a single write.
pub async fn save_account(
    store: &dyn AccountStore,
    account: &AccountEntity,
) -> Result<(), ServiceError> {
    store.save_account(account.clone()).await?;
    Ok(())
}
