mod event;
mod reminder;
mod shared;
mod user;

pub use event::{IEventRepo, InMemoryEventRepo, MongoEventRepo};
pub use reminder::{IReminderRepo, InMemoryReminderRepo, MongoReminderRepo, ReminderStoreError};
pub use user::{IUserRepo, InMemoryUserRepo, MongoUserRepo};

use mongodb::{bson::doc, options::ClientOptions, Client};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub reminders: Arc<dyn IReminderRepo>,
    pub users: Arc<dyn IUserRepo>,
}

impl Repos {
    pub async fn create_mongodb(connection_string: &str, db_name: &str) -> anyhow::Result<Self> {
        let client_options = ClientOptions::parse(connection_string).await?;
        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Make sure that the db is reachable before the server starts accepting requests
        info!("DB CHECKING CONNECTION ...");
        db.run_command(doc! { "ping": 1 }, None).await?;
        info!("DB CHECKING CONNECTION ... [done]");

        let reminders = MongoReminderRepo::new(&db);
        reminders.create_indexes().await?;

        Ok(Self {
            events: Arc::new(MongoEventRepo::new(&db)),
            reminders: Arc::new(reminders),
            users: Arc::new(MongoUserRepo::new(&db)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepo::new()),
            reminders: Arc::new(InMemoryReminderRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
        }
    }
}
