use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoAccountDocument, doc_id},
};
use crate::dao::{account_store::AccountStore, models::AccountEntity, storage::StorageResult};

const ACCOUNT_COLLECTION_NAME: &str = "accounts";

/// MongoDB-backed [`AccountStore`] implementation.
#[derive(Clone)]
pub struct MongoAccountStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoAccountStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"email": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("account_email_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ACCOUNT_COLLECTION_NAME,
                index: "email",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoAccountDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoAccountDocument>(ACCOUNT_COLLECTION_NAME)
    }

    async fn find_account(&self, id: Uuid) -> MongoResult<Option<AccountEntity>> {
        let collection = self.collection().await;

        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadAccount { id, source })?;

        document.map(AccountEntity::try_from).transpose()
    }

    async fn find_account_by_email(&self, email: String) -> MongoResult<Option<AccountEntity>> {
        let collection = self.collection().await;

        let document = collection
            .find_one(doc! {"email": email})
            .await
            .map_err(|source| MongoDaoError::LoadAccountByEmail { source })?;

        document.map(AccountEntity::try_from).transpose()
    }

    /// Replace the whole account document in one write.
    async fn save_account(&self, account: AccountEntity) -> MongoResult<()> {
        let id = account.id;
        let document: MongoAccountDocument = account.into();
        let collection = self.collection().await;

        collection
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveAccount { id, source })?;

        Ok(())
    }

    async fn delete_account(&self, id: Uuid) -> MongoResult<bool> {
        let collection = self.collection().await;
        let result = collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteAccount { id, source })?;
        Ok(result.deleted_count > 0)
    }
}

impl AccountStore for MongoAccountStore {
    fn find_account(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<AccountEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_account(id).await.map_err(Into::into) })
    }

    fn find_account_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<AccountEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_account_by_email(email).await.map_err(Into::into) })
    }

    fn save_account(&self, account: AccountEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_account(account).await.map_err(Into::into) })
    }

    fn delete_account(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_account(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
