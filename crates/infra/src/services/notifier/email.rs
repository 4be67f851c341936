use super::IReminderNotifier;
use crate::config::EmailGatewayConfig;
use anyhow::anyhow;
use eventhub_domain::{ReminderNotification, Tz};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Sends reminder emails through a transactional email gateway over http
pub struct HttpEmailNotifier {
    client: Client,
    config: EmailGatewayConfig,
    timezone: Tz,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<EmailAddress<'a>>,
    subject: String,
    text: String,
}

impl HttpEmailNotifier {
    pub fn new(config: EmailGatewayConfig, timezone: Tz, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config,
            timezone,
        })
    }
}

#[async_trait::async_trait]
impl IReminderNotifier for HttpEmailNotifier {
    async fn send(&self, notification: &ReminderNotification) -> anyhow::Result<()> {
        let body = SendEmailRequest {
            from: &self.config.from,
            to: vec![EmailAddress {
                email: &notification.recipient_email,
                name: &notification.recipient_name,
            }],
            subject: notification.subject(),
            text: notification.render_text(&self.timezone),
        };

        let res = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            let reason = res.text().await.unwrap_or_default();
            Err(anyhow!(
                "Email gateway responded with status {}: {}",
                status,
                reason
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
    use eventhub_domain::{Event, Reminder, User};
    use std::{net::TcpListener, sync::Mutex};

    struct Gateway {
        status: StatusCode,
        requests: Mutex<Vec<(Option<String>, serde_json::Value)>>,
    }

    async fn receive_email(
        req: HttpRequest,
        body: web::Json<serde_json::Value>,
        gateway: web::Data<Gateway>,
    ) -> HttpResponse {
        let auth = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .map(String::from);
        gateway.requests.lock().unwrap().push((auth, body.0));
        HttpResponse::build(gateway.status).body("queued")
    }

    fn spawn_gateway(status: StatusCode) -> (String, web::Data<Gateway>) {
        let gateway = web::Data::new(Gateway {
            status,
            requests: Mutex::new(Vec::new()),
        });
        let listener = TcpListener::bind("127.0.0.1:0").expect("To bind gateway port");
        let port = listener.local_addr().unwrap().port();

        let data = gateway.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/v1/send", web::post().to(receive_email))
        })
        .workers(1)
        .listen(listener)
        .expect("To listen on gateway port")
        .run();
        actix_web::rt::spawn(server);

        (format!("http://127.0.0.1:{}/v1/send", port), gateway)
    }

    fn notifier(url: String) -> HttpEmailNotifier {
        let config = EmailGatewayConfig {
            url,
            api_key: "gateway-key".into(),
            from: "reminders@eventhub.test".into(),
        };
        HttpEmailNotifier::new(config, Tz::UTC, Duration::from_secs(5)).unwrap()
    }

    fn notification() -> ReminderNotification {
        let user = User::new("Linh", "linh@example.com");
        let event = Event::new("Orientation week");
        let reminder = Reminder::new(
            user.id.clone(),
            event.id.clone(),
            1_700_000_000_000,
            "Bring student card".into(),
            0,
        );
        ReminderNotification::new(&reminder, &user, event)
    }

    #[actix_web::main]
    #[test]
    async fn accepted_email_is_delivered() {
        let (url, gateway) = spawn_gateway(StatusCode::ACCEPTED);
        let notification = notification();

        notifier(url)
            .send(&notification)
            .await
            .expect("Email to be accepted");

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (auth, body) = &requests[0];
        assert_eq!(auth.as_deref(), Some("Bearer gateway-key"));
        assert_eq!(body["from"], "reminders@eventhub.test");
        assert_eq!(body["to"][0]["email"], "linh@example.com");
        assert_eq!(body["to"][0]["name"], "Linh");
        assert_eq!(body["subject"], "Reminder: Orientation week");
        assert!(body["text"]
            .as_str()
            .unwrap()
            .contains("Bring student card"));
    }

    #[actix_web::main]
    #[test]
    async fn rejected_email_is_an_error() {
        let (url, gateway) = spawn_gateway(StatusCode::INTERNAL_SERVER_ERROR);

        let res = notifier(url).send(&notification()).await;
        assert!(res.is_err());
        assert_eq!(gateway.requests.lock().unwrap().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn unreachable_gateway_is_an_error() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let res = notifier(format!("http://127.0.0.1:{}/v1/send", port))
            .send(&notification())
            .await;
        assert!(res.is_err());
    }
}
