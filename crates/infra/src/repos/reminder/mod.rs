mod inmemory;
mod mongo;

pub use inmemory::InMemoryReminderRepo;
pub use mongo::MongoReminderRepo;

use eventhub_domain::{Reminder, ReminderChanges, ID};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReminderStoreError {
    /// Another `Reminder` already exists for the same user, event and `remind_at`
    #[error("A reminder for this user, event and time already exists")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    /// Stores a new `Reminder`, rejecting it with `ReminderStoreError::Conflict` if the
    /// (user, event, remind_at) triple is taken
    async fn insert(&self, reminder: &Reminder) -> Result<(), ReminderStoreError>;
    /// Applies a user edit as a single targeted write. `sent` is only reset when
    /// `remind_at` changes, so a concurrent `mark_sent` is never overwritten.
    /// Returns the updated `Reminder`, or `None` if it does not exist.
    async fn update(
        &self,
        reminder_id: &ID,
        changes: &ReminderChanges,
    ) -> Result<Option<Reminder>, ReminderStoreError>;
    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>>;
    async fn find_by_user_and_event(
        &self,
        user_id: &ID,
        event_id: &ID,
    ) -> anyhow::Result<Vec<Reminder>>;
    /// Unsent `Reminder`s with `remind_at` in `[now - lookback_millis, now]`
    async fn find_due_unsent(&self, now: i64, lookback_millis: i64)
        -> anyhow::Result<Vec<Reminder>>;
    /// Atomically sets `sent` to true. Succeeds if the `Reminder` was already sent
    /// or has been deleted in the meantime.
    async fn mark_sent(&self, reminder_id: &ID) -> anyhow::Result<()>;
    async fn delete(&self, reminder_id: &ID) -> Option<Reminder>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;
    const LOOKBACK: i64 = 1000 * 120;

    fn reminder_at(remind_at: i64) -> Reminder {
        Reminder::new(ID::new(), ID::new(), remind_at, String::new(), NOW - 1000 * 60 * 60)
    }

    #[tokio::test]
    async fn rejects_duplicate_reminders() {
        let repo = InMemoryReminderRepo::new();
        let reminder = reminder_at(NOW);
        repo.insert(&reminder).await.expect("To insert reminder");

        let mut duplicate = reminder.clone();
        duplicate.id = ID::new();
        duplicate.note = "Another note".into();
        assert!(matches!(
            repo.insert(&duplicate).await,
            Err(ReminderStoreError::Conflict)
        ));

        // Different time for the same user and event is fine
        let mut other_time = duplicate.clone();
        other_time.remind_at = NOW + 1000;
        assert!(repo.insert(&other_time).await.is_ok());

        // Moving it onto the taken time is not
        let move_back = ReminderChanges {
            remind_at: Some(NOW),
            note: None,
        };
        assert!(matches!(
            repo.update(&other_time.id, &move_back).await,
            Err(ReminderStoreError::Conflict)
        ));
    }

    #[tokio::test]
    async fn note_edit_on_stale_copy_keeps_sent_flag() {
        let repo = InMemoryReminderRepo::new();
        let reminder = reminder_at(NOW);
        repo.insert(&reminder).await.expect("To insert reminder");

        // The edit starts from a copy read before the scheduler marked it sent
        let stale = repo.find(&reminder.id).await.unwrap().expect("Reminder to exist");
        assert!(!stale.sent);
        repo.mark_sent(&reminder.id).await.expect("To mark sent");

        let changes = ReminderChanges {
            remind_at: Some(stale.remind_at),
            note: Some("Edited note".into()),
        };
        let updated = repo
            .update(&reminder.id, &changes)
            .await
            .expect("To update reminder")
            .expect("Reminder to exist");
        assert!(updated.sent);
        assert_eq!(updated.note, "Edited note");
        assert!(repo
            .find_due_unsent(NOW, LOOKBACK)
            .await
            .expect("To query due reminders")
            .is_empty());
    }

    #[tokio::test]
    async fn moving_reminder_makes_it_pending_again() {
        let repo = InMemoryReminderRepo::new();
        let reminder = reminder_at(NOW - 1000 * 60);
        repo.insert(&reminder).await.expect("To insert reminder");
        repo.mark_sent(&reminder.id).await.expect("To mark sent");

        let changes = ReminderChanges {
            remind_at: Some(NOW - 1000 * 30),
            note: None,
        };
        let updated = repo
            .update(&reminder.id, &changes)
            .await
            .expect("To update reminder")
            .expect("Reminder to exist");
        assert!(!updated.sent);
        assert_eq!(
            repo.find_due_unsent(NOW, LOOKBACK)
                .await
                .expect("To query due reminders"),
            vec![updated]
        );

        assert!(repo
            .update(&ID::new(), &changes)
            .await
            .expect("To run update")
            .is_none());
    }

    #[tokio::test]
    async fn finds_only_unsent_reminders_inside_lookback_window() {
        let repo = InMemoryReminderRepo::new();
        let due = reminder_at(NOW - 1000 * 30);
        let aged_out = reminder_at(NOW - 1000 * 150);
        let upcoming = reminder_at(NOW + 1000 * 30);
        let mut already_sent = reminder_at(NOW - 1000 * 10);
        already_sent.sent = true;
        for r in &[&due, &aged_out, &upcoming, &already_sent] {
            repo.insert(r).await.expect("To insert reminder");
        }

        let res = repo
            .find_due_unsent(NOW, LOOKBACK)
            .await
            .expect("To query due reminders");
        assert_eq!(res, vec![due]);
    }

    #[tokio::test]
    async fn mark_sent_is_idempotent() {
        let repo = InMemoryReminderRepo::new();
        let reminder = reminder_at(NOW);
        repo.insert(&reminder).await.expect("To insert reminder");

        assert!(repo.mark_sent(&reminder.id).await.is_ok());
        assert!(repo.mark_sent(&reminder.id).await.is_ok());
        assert!(
            repo.find(&reminder.id)
                .await
                .unwrap()
                .expect("Reminder to exist")
                .sent
        );
        assert!(repo
            .find_due_unsent(NOW, LOOKBACK)
            .await
            .expect("To query due reminders")
            .is_empty());

        // Deleted reminders are not an error either
        repo.delete(&reminder.id).await;
        assert!(repo.mark_sent(&reminder.id).await.is_ok());
    }

    #[tokio::test]
    async fn finds_reminders_by_user_and_event_ordered_by_time() {
        let repo = InMemoryReminderRepo::new();
        let user_id = ID::new();
        let event_id = ID::new();
        let later = Reminder::new(user_id.clone(), event_id.clone(), NOW + 2000, "".into(), NOW);
        let earlier = Reminder::new(user_id.clone(), event_id.clone(), NOW + 1000, "".into(), NOW);
        let other_user = Reminder::new(ID::new(), event_id.clone(), NOW + 1000, "".into(), NOW);
        for r in &[&later, &earlier, &other_user] {
            repo.insert(r).await.expect("To insert reminder");
        }

        let res = repo
            .find_by_user_and_event(&user_id, &event_id)
            .await
            .expect("To find reminders");
        assert_eq!(res, vec![earlier, later]);
    }
}
