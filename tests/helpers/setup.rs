use eventhub_api::Application;
use eventhub_domain::{Event, User};
use eventhub_infra::{EventHubContext, InMemoryEventRepo, InMemoryNotifier, InMemoryUserRepo};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;

pub struct TestApp {
    pub ctx: EventHubContext,
    pub notifier: Arc<InMemoryNotifier>,
    pub users: Arc<InMemoryUserRepo>,
    pub events: Arc<InMemoryEventRepo>,
    pub address: String,
    pub client: reqwest::Client,
}

#[derive(Serialize)]
struct Claims {
    exp: usize,
    id: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    pub fn token_for(&self, user: &User) -> String {
        let claims = Claims {
            exp: (chrono::Utc::now().timestamp() + 60 * 60) as usize,
            id: user.id.as_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.ctx.config.jwt_secret.as_bytes()),
        )
        .expect("To encode token")
    }

    pub async fn insert_user(&self, name: &str, email: &str) -> User {
        let user = User::new(name, email);
        self.users.insert(&user);
        user
    }

    pub async fn insert_event(&self, title: &str) -> Event {
        let event = Event::new(title);
        self.events.insert(&event);
        event
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut EventHubContext)) -> TestApp {
    let mut ctx = EventHubContext::create_inmemory();
    ctx.config.port = 0; // Random port
    let notifier = Arc::new(InMemoryNotifier::new());
    ctx.notifier = notifier.clone();
    // Users and events are owned by other services, the tests seed them directly
    let users = Arc::new(InMemoryUserRepo::new());
    ctx.repos.users = users.clone();
    let events = Arc::new(InMemoryEventRepo::new());
    ctx.repos.events = events.clone();
    configure(&mut ctx);

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        ctx,
        notifier,
        users,
        events,
        address,
        client: reqwest::Client::new(),
    }
}
