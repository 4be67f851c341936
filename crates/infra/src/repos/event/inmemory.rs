use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use eventhub_domain::{Event, ID};

pub struct InMemoryEventRepo {
    events: std::sync::Mutex<Vec<Event>>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Stands in for the events subsystem publishing an `Event`
    pub fn insert(&self, e: &Event) {
        insert(e, &self.events);
    }

    pub fn delete(&self, event_id: &ID) -> Option<Event> {
        delete(event_id, &self.events)
    }
}

impl Default for InMemoryEventRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<Event>> {
        Ok(find(event_id, &self.events))
    }
}
