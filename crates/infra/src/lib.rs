mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, EmailGatewayConfig};
pub use repos::{
    IEventRepo, IReminderRepo, IUserRepo, InMemoryEventRepo, InMemoryReminderRepo,
    InMemoryUserRepo, ReminderStoreError, Repos,
};
pub use services::*;
use std::{sync::Arc, time::Duration};
pub use system::ISys;
use system::RealSys;
use tracing::warn;

#[derive(Clone)]
pub struct EventHubContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifier: Arc<dyn IReminderNotifier>,
}

struct ContextParams {
    pub mongodb_connection_string: String,
    pub mongodb_db_name: String,
}

impl EventHubContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let repos = Repos::create_mongodb(
            &params.mongodb_connection_string,
            &params.mongodb_db_name,
        )
        .await?;
        let config = Config::new();
        let notifier = create_notifier(&config)?;
        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            notifier,
        })
    }

    /// Context backed by inmemory repositories, mostly useful for testing
    pub fn create_inmemory() -> Self {
        let config = Config::new();
        let notifier: Arc<dyn IReminderNotifier> =
            Arc::new(LogNotifier::new(config.notification_timezone));
        Self {
            repos: Repos::create_inmemory(),
            config,
            sys: Arc::new(RealSys {}),
            notifier,
        }
    }
}

fn create_notifier(config: &Config) -> anyhow::Result<Arc<dyn IReminderNotifier>> {
    let notifier: Arc<dyn IReminderNotifier> = match &config.email_gateway {
        Some(gateway) => Arc::new(HttpEmailNotifier::new(
            gateway.clone(),
            config.notification_timezone,
            Duration::from_secs(config.notifier_timeout_secs),
        )?),
        None => Arc::new(LogNotifier::new(config.notification_timezone)),
    };
    Ok(notifier)
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<EventHubContext> {
    match get_mongodb_connection_string() {
        Some(mongodb_connection_string) => {
            EventHubContext::create(ContextParams {
                mongodb_connection_string,
                mongodb_db_name: std::env::var("MONGODB_DB_NAME")
                    .unwrap_or_else(|_| "eventhub".into()),
            })
            .await
        }
        None => {
            warn!("Did not find MONGODB_URI environment variable. Going to use inmemory repositories, nothing will be persisted.");
            Ok(EventHubContext::create_inmemory())
        }
    }
}

fn get_mongodb_connection_string() -> Option<String> {
    std::env::var("MONGODB_URI")
        .or_else(|_| std::env::var("MONGO_URI"))
        .ok()
        .filter(|uri| !uri.is_empty())
}
