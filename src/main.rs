mod telemetry;

use eventhub_api::Application;
use eventhub_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};
use tracing::error;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("eventhub_reminders".into(), "info".into());
    init_subscriber(subscriber);

    let context = match setup_context().await {
        Ok(context) => context,
        Err(e) => {
            error!("Unable to set up the application context: {:?}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let app = Application::new(context).await?;
    app.start().await
}
