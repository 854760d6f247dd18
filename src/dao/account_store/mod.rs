/// In-memory store for tests.
#[cfg(test)]
pub mod memory;
/// MongoDB-backed store.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::AccountEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer holding application accounts.
///
/// Every save replaces the whole account document, so a single call is atomic
/// from the point of view of readers.
pub trait AccountStore: Send + Sync {
    /// Fetch an account by its identifier.
    fn find_account(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<AccountEntity>>>;
    /// Fetch an account by its (unique) email address.
    fn find_account_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<AccountEntity>>>;
    /// Insert or replace the whole account document.
    fn save_account(&self, account: AccountEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove an account; `false` when it did not exist.
    fn delete_account(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Cheap round-trip proving the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the underlying connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
