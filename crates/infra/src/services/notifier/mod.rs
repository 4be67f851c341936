mod dry_run;
mod email;
mod inmemory;

pub use dry_run::LogNotifier;
pub use email::HttpEmailNotifier;
pub use inmemory::InMemoryNotifier;

use eventhub_domain::ReminderNotification;

/// Delivers `ReminderNotification`s to `User`s.
///
/// An `Ok` means that the notification was handed over to the delivery
/// channel, any error means it was not and should be retried later.
#[async_trait::async_trait]
pub trait IReminderNotifier: Send + Sync {
    async fn send(&self, notification: &ReminderNotification) -> anyhow::Result<()>;
}
