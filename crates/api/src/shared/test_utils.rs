use eventhub_domain::{Reminder, ReminderChanges, ID};
use eventhub_infra::{IReminderRepo, InMemoryReminderRepo, ReminderStoreError};
use std::sync::atomic::{AtomicBool, Ordering};

/// `IReminderRepo` backed by the in memory repo whose queries and
/// `mark_sent` writes can be switched to fail
#[derive(Default)]
pub struct FlakyReminderRepo {
    inner: InMemoryReminderRepo,
    fail_queries: AtomicBool,
    fail_marks: AtomicBool,
}

impl FlakyReminderRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_marks(&self, fail: bool) {
        self.fail_marks.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IReminderRepo for FlakyReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> Result<(), ReminderStoreError> {
        self.inner.insert(reminder).await
    }

    async fn update(
        &self,
        reminder_id: &ID,
        changes: &ReminderChanges,
    ) -> Result<Option<Reminder>, ReminderStoreError> {
        self.inner.update(reminder_id, changes).await
    }

    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        self.inner.find(reminder_id).await
    }

    async fn find_by_user_and_event(
        &self,
        user_id: &ID,
        event_id: &ID,
    ) -> anyhow::Result<Vec<Reminder>> {
        self.inner.find_by_user_and_event(user_id, event_id).await
    }

    async fn find_due_unsent(
        &self,
        now: i64,
        lookback_millis: i64,
    ) -> anyhow::Result<Vec<Reminder>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            anyhow::bail!("Connection to the reminder store was lost");
        }
        self.inner.find_due_unsent(now, lookback_millis).await
    }

    async fn mark_sent(&self, reminder_id: &ID) -> anyhow::Result<()> {
        if self.fail_marks.load(Ordering::SeqCst) {
            anyhow::bail!("Write to the reminder store timed out");
        }
        self.inner.mark_sent(reminder_id).await
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        self.inner.delete(reminder_id).await
    }
}
