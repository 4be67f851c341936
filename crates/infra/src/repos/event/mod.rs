mod inmemory;
mod mongo;

use eventhub_domain::{Event, ID};
pub use inmemory::InMemoryEventRepo;
pub use mongo::MongoEventRepo;

/// Read access to the `Event`s managed by the events subsystem
#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<Event>>;
}
