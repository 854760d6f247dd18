use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// Connection string rejected by the driver.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Driver refused the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Server never answered while connecting.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Attempts made before giving up.
        attempts: u32,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Periodic ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Index creation failed at startup.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Target collection.
        collection: &'static str,
        /// Index name.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Upsert of an account document failed.
    #[error("failed to save account `{id}`")]
    SaveAccount {
        /// Account concerned.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Lookup by id failed.
    #[error("failed to load account `{id}`")]
    LoadAccount {
        /// Account concerned.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Lookup by email failed.
    #[error("failed to look up account by email")]
    LoadAccountByEmail {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Deletion failed.
    #[error("failed to delete account `{id}`")]
    DeleteAccount {
        /// Account concerned.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Stored `_id` is not a UUID.
    #[error("stored account id `{raw}` is not a valid UUID")]
    InvalidAccountId {
        /// Raw stored value.
        raw: String,
        /// Parse error.
        #[source]
        source: uuid::Error,
    },
}
