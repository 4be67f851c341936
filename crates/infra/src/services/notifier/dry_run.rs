use super::IReminderNotifier;
use eventhub_domain::{ReminderNotification, Tz};
use tracing::info;

/// Used when no email gateway is configured. Logs the rendered email
/// and reports it as delivered.
pub struct LogNotifier {
    timezone: Tz,
}

impl LogNotifier {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

#[async_trait::async_trait]
impl IReminderNotifier for LogNotifier {
    async fn send(&self, notification: &ReminderNotification) -> anyhow::Result<()> {
        info!(
            recipient = %notification.recipient_email,
            subject = %notification.subject(),
            "[dry run] Reminder email:\n{}",
            notification.render_text(&self.timezone)
        );
        Ok(())
    }
}
