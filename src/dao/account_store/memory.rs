use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{account_store::AccountStore, models::AccountEntity, storage::StorageResult};

/// In-process [`AccountStore`] used by the service and router tests.
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    accounts: Arc<DashMap<Uuid, AccountEntity>>,
}

impl MemoryAccountStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account without going through the trait.
    pub fn insert(&self, account: AccountEntity) {
        self.accounts.insert(account.id, account);
    }

    /// Read an account back without going through the trait.
    pub fn get(&self, id: Uuid) -> Option<AccountEntity> {
        self.accounts.get(&id).map(|entry| entry.value().clone())
    }
}

impl AccountStore for MemoryAccountStore {
    fn find_account(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<AccountEntity>>> {
        let found = self.get(id);
        Box::pin(async move { Ok(found) })
    }

    fn find_account_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<AccountEntity>>> {
        let found = self
            .accounts
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn save_account(&self, account: AccountEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.insert(account);
        Box::pin(async { Ok(()) })
    }

    fn delete_account(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.accounts.remove(&id).is_some();
        Box::pin(async move { Ok(removed) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_save_and_delete_by_id_and_email() {
        let store = MemoryAccountStore::new();
        let account = AccountEntity::new(Uuid::new_v4(), "player@example.com");

        store.save_account(account.clone()).await.unwrap();

        assert_eq!(
            store.find_account(account.id).await.unwrap(),
            Some(account.clone())
        );
        assert_eq!(
            store
                .find_account_by_email("player@example.com".into())
                .await
                .unwrap(),
            Some(account.clone())
        );
        assert!(
            store
                .find_account_by_email("nobody@example.com".into())
                .await
                .unwrap()
                .is_none()
        );

        assert!(store.delete_account(account.id).await.unwrap());
        assert!(!store.delete_account(account.id).await.unwrap());
        assert!(store.find_account(account.id).await.unwrap().is_none());
    }
}
