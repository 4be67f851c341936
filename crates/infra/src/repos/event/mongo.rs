use super::IEventRepo;
use crate::repos::shared::mongo_repo::{self, MongoDocument};
use eventhub_domain::{Event, ID};
use mongodb::{
    bson::{oid::ObjectId, DateTime, Document},
    Collection, Database,
};
use serde::Deserialize;

pub struct MongoEventRepo {
    collection: Collection<Document>,
}

impl MongoEventRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("events"),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for MongoEventRepo {
    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<Event>> {
        mongo_repo::find::<_, EventMongo>(&self.collection, event_id.inner_ref()).await
    }
}

/// The event documents are written by the events subsystem. Only the fields
/// a reminder renders are read, everything else is ignored.
#[derive(Debug, Deserialize)]
struct EventMongo {
    _id: ObjectId,
    title: String,
    content: Option<String>,
    location: Option<String>,
    organization: Option<String>,
    #[serde(rename = "startDate")]
    start_date: Option<DateTime>,
    #[serde(rename = "endDate")]
    end_date: Option<DateTime>,
}

impl MongoDocument<Event> for EventMongo {
    fn to_domain(self) -> Event {
        Event {
            id: ID::from(self._id),
            title: self.title,
            content: self.content,
            location: self.location,
            organization: self.organization,
            start_ts: self.start_date.map(|date| date.timestamp_millis()),
            end_ts: self.end_date.map(|date| date.timestamp_millis()),
        }
    }
}
