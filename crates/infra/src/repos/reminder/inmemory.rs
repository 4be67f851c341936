use super::{IReminderRepo, ReminderStoreError};
use crate::repos::shared::inmemory_repo::*;
use eventhub_domain::{DueWindow, Reminder, ReminderChanges, ID};
use std::sync::Mutex;

pub struct InMemoryReminderRepo {
    reminders: Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryReminderRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn same_key(r1: &Reminder, r2: &Reminder) -> bool {
    r1.user_id == r2.user_id && r1.event_id == r2.event_id && r1.remind_at == r2.remind_at
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> Result<(), ReminderStoreError> {
        // Check and push under the same lock, like a unique index would
        let mut reminders = self.reminders.lock().unwrap();
        if reminders.iter().any(|r| same_key(r, reminder)) {
            return Err(ReminderStoreError::Conflict);
        }
        reminders.push(reminder.clone());
        Ok(())
    }

    async fn update(
        &self,
        reminder_id: &ID,
        changes: &ReminderChanges,
    ) -> Result<Option<Reminder>, ReminderStoreError> {
        let mut reminders = self.reminders.lock().unwrap();
        let mut updated = match reminders.iter().find(|r| r.id == *reminder_id) {
            Some(reminder) => reminder.clone(),
            None => return Ok(None),
        };
        changes.apply(&mut updated);
        if reminders
            .iter()
            .any(|r| r.id != updated.id && same_key(r, &updated))
        {
            return Err(ReminderStoreError::Conflict);
        }

        // Applied to the stored item, not written back from a copy
        if let Some(existing) = reminders.iter_mut().find(|r| r.id == *reminder_id) {
            changes.apply(existing);
        }
        Ok(Some(updated))
    }

    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        Ok(find(reminder_id, &self.reminders))
    }

    async fn find_by_user_and_event(
        &self,
        user_id: &ID,
        event_id: &ID,
    ) -> anyhow::Result<Vec<Reminder>> {
        let mut reminders = find_by(&self.reminders, |r| {
            r.user_id == *user_id && r.event_id == *event_id
        });
        reminders.sort_by_key(|r| r.remind_at);
        Ok(reminders)
    }

    async fn find_due_unsent(
        &self,
        now: i64,
        lookback_millis: i64,
    ) -> anyhow::Result<Vec<Reminder>> {
        let window = DueWindow::ending_at(now, lookback_millis);
        Ok(find_by(&self.reminders, |r| r.is_due(&window)))
    }

    async fn mark_sent(&self, reminder_id: &ID) -> anyhow::Result<()> {
        update_one(reminder_id, &self.reminders, |r| r.sent = true);
        Ok(())
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        delete(reminder_id, &self.reminders)
    }
}
