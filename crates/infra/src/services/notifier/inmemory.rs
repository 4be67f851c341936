use super::IReminderNotifier;
use anyhow::anyhow;
use eventhub_domain::ReminderNotification;
use std::{collections::HashSet, sync::Mutex, time::Duration};

/// Notifier that keeps delivered notifications in memory.
///
/// Delivery can be made to fail for specific recipients or to stall for a
/// while, which is what the scheduler tests need.
pub struct InMemoryNotifier {
    delivered: Mutex<Vec<ReminderNotification>>,
    attempts: Mutex<Vec<String>>,
    failing_recipients: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            attempts: Mutex::new(Vec::new()),
            failing_recipients: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
        }
    }

    pub fn fail_for(&self, recipient_email: &str) {
        self.failing_recipients
            .lock()
            .unwrap()
            .insert(recipient_email.to_string());
    }

    pub fn recover(&self, recipient_email: &str) {
        self.failing_recipients
            .lock()
            .unwrap()
            .remove(recipient_email);
    }

    /// Every following delivery waits this long before completing
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn delivered(&self) -> Vec<ReminderNotification> {
        self.delivered.lock().unwrap().clone()
    }

    /// Number of delivery attempts, failed ones included, for the given recipient
    pub fn attempts_for(&self, recipient_email: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|email| *email == recipient_email)
            .count()
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IReminderNotifier for InMemoryNotifier {
    async fn send(&self, notification: &ReminderNotification) -> anyhow::Result<()> {
        self.attempts
            .lock()
            .unwrap()
            .push(notification.recipient_email.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .failing_recipients
            .lock()
            .unwrap()
            .contains(&notification.recipient_email)
        {
            return Err(anyhow!(
                "Delivery to {} failed",
                notification.recipient_email
            ));
        }

        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
