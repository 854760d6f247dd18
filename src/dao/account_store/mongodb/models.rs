use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::{AccountEntity, SpotifyLinkEntity};

/// Account document as stored in the `accounts` collection.
///
/// The UUID is kept as its hyphenated string so the `_id` filter stays a plain
/// string match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAccountDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub spotify: SpotifyLinkEntity,
}

impl From<AccountEntity> for MongoAccountDocument {
    fn from(value: AccountEntity) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email,
            spotify: value.spotify,
        }
    }
}

impl TryFrom<MongoAccountDocument> for AccountEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoAccountDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id).map_err(|source| MongoDaoError::InvalidAccountId {
            raw: value.id.clone(),
            source,
        })?;
        Ok(Self {
            id,
            email: value.email,
            spotify: value.spotify,
        })
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}
