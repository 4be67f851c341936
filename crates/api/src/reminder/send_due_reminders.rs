use crate::shared::usecase::UseCase;
use eventhub_domain::{Reminder, ReminderNotification};
use eventhub_infra::{Config, EventHubContext};
use futures::future::join_all;
use std::time::Duration;
use tracing::{error, info, warn};

/// Sends every unsent `Reminder` that became due within the lookback
/// window and marks the delivered ones as sent.
///
/// A `Reminder` that could not be delivered is left unsent so that the
/// next run picks it up again, until it falls out of the lookback window.
#[derive(Debug)]
pub struct SendDueRemindersUseCase {
    pub lookback_millis: i64,
    /// Upper bound on a single delivery
    pub send_timeout: Duration,
}

impl SendDueRemindersUseCase {
    pub fn new(config: &Config) -> Self {
        Self {
            lookback_millis: config.reminder_lookback_millis(),
            send_timeout: Duration::from_secs(config.notifier_timeout_secs),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    StorageError,
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Sent,
    Failed,
    Skipped,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDueRemindersUseCase {
    type Response = TickReport;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "SendDueReminders";

    async fn execute(&mut self, ctx: &EventHubContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let reminders = ctx
            .repos
            .reminders
            .find_due_unsent(now, self.lookback_millis)
            .await
            .map_err(|e| {
                error!("Unable to query due reminders: {:?}", e);
                UseCaseErrors::StorageError
            })?;

        let mut report = TickReport {
            due: reminders.len(),
            ..Default::default()
        };

        let outcomes = join_all(
            reminders
                .iter()
                .map(|reminder| process_reminder(reminder, self.send_timeout, ctx)),
        )
        .await;
        for outcome in outcomes {
            match outcome {
                Outcome::Sent => report.sent += 1,
                Outcome::Failed => report.failed += 1,
                Outcome::Skipped => report.skipped += 1,
            }
        }

        info!(
            "Reminder tick done. due: {}, sent: {}, failed: {}, skipped: {}",
            report.due, report.sent, report.failed, report.skipped
        );

        Ok(report)
    }
}

async fn process_reminder(
    reminder: &Reminder,
    send_timeout: Duration,
    ctx: &EventHubContext,
) -> Outcome {
    let user = match ctx.repos.users.find(&reminder.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(
                "Skipping reminder: {} as its user: {} was not found",
                reminder.id, reminder.user_id
            );
            return Outcome::Skipped;
        }
        Err(e) => {
            error!(
                "Unable to look up user: {} of reminder: {}. Error: {:?}",
                reminder.user_id, reminder.id, e
            );
            return Outcome::Failed;
        }
    };
    let event = match ctx.repos.events.find(&reminder.event_id).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            warn!(
                "Skipping reminder: {} as its event: {} was not found",
                reminder.id, reminder.event_id
            );
            return Outcome::Skipped;
        }
        Err(e) => {
            error!(
                "Unable to look up event: {} of reminder: {}. Error: {:?}",
                reminder.event_id, reminder.id, e
            );
            return Outcome::Failed;
        }
    };

    let notification = ReminderNotification::new(reminder, &user, event);
    match tokio::time::timeout(send_timeout, ctx.notifier.send(&notification)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            warn!("Unable to send reminder: {}. Error: {:?}", reminder.id, e);
            return Outcome::Failed;
        }
        Err(_) => {
            warn!(
                "Sending reminder: {} timed out after {:?}",
                reminder.id, send_timeout
            );
            return Outcome::Failed;
        }
    }

    // Left unsent on failure, which means it might be delivered twice
    if let Err(e) = ctx.repos.reminders.mark_sent(&reminder.id).await {
        error!(
            "Reminder: {} was sent but could not be marked as sent. Error: {:?}",
            reminder.id, e
        );
        return Outcome::Failed;
    }

    Outcome::Sent
}
