/// Account storage backends and the trait they implement.
pub mod account_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
