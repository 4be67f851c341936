use super::IUserRepo;
use crate::repos::shared::mongo_repo::{self, MongoDocument};
use eventhub_domain::{User, ID};
use mongodb::{
    bson::{oid::ObjectId, Document},
    Collection, Database,
};
use serde::Deserialize;

pub struct MongoUserRepo {
    collection: Collection<Document>,
}

impl MongoUserRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for MongoUserRepo {
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<User>> {
        mongo_repo::find::<_, UserMongo>(&self.collection, user_id.inner_ref()).await
    }
}

/// Only the fields a reminder needs. Password hash, role and the rest of the
/// account document are ignored.
#[derive(Debug, Deserialize)]
struct UserMongo {
    _id: ObjectId,
    #[serde(default)]
    name: String,
    email: String,
}

impl MongoDocument<User> for UserMongo {
    fn to_domain(self) -> User {
        User {
            id: ID::from(self._id),
            name: self.name,
            email: self.email,
        }
    }
}
