mod error;
mod job_schedulers;
mod reminder;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use error::EventHubError;
use eventhub_infra::{Config, EventHubContext};
pub use job_schedulers::ReminderScheduler;
pub use reminder::send_due_reminders::TickReport;
use std::net::TcpListener;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    reminder::configure_routes(cfg);
    status::configure_routes(cfg);
}

fn create_cors(config: &Config) -> Cors {
    if config.cors_origins.is_empty() {
        return Cors::permissive();
    }
    config
        .cors_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

pub struct Application {
    server: Server,
    port: u16,
    reminder_scheduler: ReminderScheduler,
}

impl Application {
    pub async fn new(context: EventHubContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        let mut reminder_scheduler = ReminderScheduler::new(context);
        reminder_scheduler.start();

        Ok(Self {
            server,
            port,
            reminder_scheduler,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(context: EventHubContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        info!("Listening on port: {}", port);

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(create_cors(&ctx.config))
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::PathConfig::default().error_handler(|err, _| {
                    EventHubError::BadClientData(err.to_string()).into()
                }))
                .app_data(web::JsonConfig::default().error_handler(|err, _| {
                    EventHubError::BadClientData(err.to_string()).into()
                }))
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(mut self) -> Result<(), std::io::Error> {
        let res = self.server.await;
        self.reminder_scheduler.stop();
        res
    }
}
