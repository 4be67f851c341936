use super::{IReminderRepo, ReminderStoreError};
use crate::repos::shared::mongo_repo::{
    self, is_duplicate_key_error, persistence_to_entity, MongoDocument, MongoWritableDocument,
};
use eventhub_domain::{DueWindow, Reminder, ReminderChanges, ID};
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

pub struct MongoReminderRepo {
    collection: Collection<Document>,
}

impl MongoReminderRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("reminders"),
        }
    }

    /// The scheduler scans on (sent, remind_at) every tick, and the
    /// (user_id, event_id, remind_at) triple must be unique
    pub async fn create_indexes(&self) -> anyhow::Result<()> {
        mongo_repo::create_index(
            &self.collection,
            doc! { "sent": 1, "remind_at": 1 },
            false,
        )
        .await?;
        mongo_repo::create_index(
            &self.collection,
            doc! { "user_id": 1, "event_id": 1, "remind_at": 1 },
            true,
        )
        .await
    }
}

/// Update pipeline for a user edit. Inside a pipeline `$remind_at` refers to the
/// stored value, so `sent` is only reset when the time really changes and is
/// otherwise left to whatever the scheduler wrote.
fn update_pipeline(changes: &ReminderChanges) -> Option<Vec<Document>> {
    let mut set = Document::new();
    if let Some(note) = &changes.note {
        set.insert("note", doc! { "$literal": note.as_str() });
    }
    if let Some(remind_at) = changes.remind_at {
        set.insert(
            "sent",
            doc! {
                "$cond": [
                    { "$eq": ["$remind_at", remind_at] },
                    "$sent",
                    false
                ]
            },
        );
        set.insert("remind_at", remind_at);
    }

    if set.is_empty() {
        None
    } else {
        Some(vec![doc! { "$set": set }])
    }
}

fn to_store_error(err: anyhow::Error) -> ReminderStoreError {
    if is_duplicate_key_error(&err) {
        ReminderStoreError::Conflict
    } else {
        ReminderStoreError::Storage(err)
    }
}

#[async_trait::async_trait]
impl IReminderRepo for MongoReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> Result<(), ReminderStoreError> {
        mongo_repo::insert::<_, ReminderMongo>(&self.collection, reminder)
            .await
            .map_err(to_store_error)
    }

    async fn update(
        &self,
        reminder_id: &ID,
        changes: &ReminderChanges,
    ) -> Result<Option<Reminder>, ReminderStoreError> {
        let pipeline = match update_pipeline(changes) {
            Some(pipeline) => pipeline,
            None => return self.find(reminder_id).await.map_err(ReminderStoreError::Storage),
        };
        let filter = doc! {
            "_id": reminder_id.inner_ref(),
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(filter, pipeline, options)
            .await
            .map_err(|e| to_store_error(anyhow::Error::new(e)))?;
        match updated {
            Some(doc) => persistence_to_entity::<_, ReminderMongo>(doc)
                .map(Some)
                .map_err(ReminderStoreError::Storage),
            None => Ok(None),
        }
    }

    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        mongo_repo::find::<_, ReminderMongo>(&self.collection, reminder_id.inner_ref()).await
    }

    async fn find_by_user_and_event(
        &self,
        user_id: &ID,
        event_id: &ID,
    ) -> anyhow::Result<Vec<Reminder>> {
        let filter = doc! {
            "user_id": user_id.inner_ref(),
            "event_id": event_id.inner_ref(),
        };
        let options = FindOptions::builder().sort(doc! { "remind_at": 1 }).build();
        mongo_repo::find_many_by::<_, ReminderMongo>(&self.collection, filter, Some(options)).await
    }

    async fn find_due_unsent(
        &self,
        now: i64,
        lookback_millis: i64,
    ) -> anyhow::Result<Vec<Reminder>> {
        let window = DueWindow::ending_at(now, lookback_millis);
        let filter = doc! {
            "sent": false,
            "remind_at": {
                "$gte": window.start,
                "$lte": window.end,
            }
        };
        mongo_repo::find_many_by::<_, ReminderMongo>(&self.collection, filter, None).await
    }

    async fn mark_sent(&self, reminder_id: &ID) -> anyhow::Result<()> {
        let filter = doc! {
            "_id": reminder_id.inner_ref(),
        };
        let update = doc! {
            "$set": {
                "sent": true
            }
        };
        self.collection.update_one(filter, update, None).await?;
        Ok(())
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        mongo_repo::delete::<_, ReminderMongo>(&self.collection, reminder_id.inner_ref()).await
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ReminderMongo {
    _id: ObjectId,
    user_id: ObjectId,
    event_id: ObjectId,
    remind_at: i64,
    #[serde(default)]
    note: String,
    created: i64,
    #[serde(default)]
    sent: bool,
}

impl MongoDocument<Reminder> for ReminderMongo {
    fn to_domain(self) -> Reminder {
        Reminder {
            id: ID::from(self._id),
            user_id: ID::from(self.user_id),
            event_id: ID::from(self.event_id),
            remind_at: self.remind_at,
            note: self.note,
            created: self.created,
            sent: self.sent,
        }
    }
}

impl MongoWritableDocument<Reminder> for ReminderMongo {
    fn from_domain(reminder: &Reminder) -> Self {
        Self {
            _id: *reminder.id.inner_ref(),
            user_id: *reminder.user_id.inner_ref(),
            event_id: *reminder.event_id.inner_ref(),
            remind_at: reminder.remind_at,
            note: reminder.note.clone(),
            created: reminder.created,
            sent: reminder.sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_stage(pipeline: &[Document]) -> &Document {
        pipeline[0].get_document("$set").expect("A $set stage")
    }

    #[test]
    fn note_edit_does_not_touch_sent() {
        let changes = ReminderChanges {
            remind_at: None,
            note: Some("$sent".into()),
        };
        let pipeline = update_pipeline(&changes).expect("A pipeline");
        let set = set_stage(&pipeline);
        assert!(!set.contains_key("sent"));
        assert!(!set.contains_key("remind_at"));
        assert_eq!(set.get_document("note").unwrap(), &doc! { "$literal": "$sent" });
    }

    #[test]
    fn time_edit_only_resets_sent_when_time_differs() {
        let changes = ReminderChanges {
            remind_at: Some(1_700_000_000_000),
            note: None,
        };
        let pipeline = update_pipeline(&changes).expect("A pipeline");
        let set = set_stage(&pipeline);
        assert_eq!(set.get_i64("remind_at").unwrap(), 1_700_000_000_000);
        let sent = set.get_document("sent").unwrap();
        assert!(sent.contains_key("$cond"));
    }

    #[test]
    fn empty_edit_has_no_pipeline() {
        assert!(update_pipeline(&ReminderChanges::default()).is_none());
    }
}
