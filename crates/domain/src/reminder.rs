use crate::shared::entity::{Entity, ID};

/// A `Reminder` is a `User`s request to be notified about an `Event`
/// at a specific point in time.
///
/// At most one `Reminder` can exist for a given `user_id`, `event_id`
/// and `remind_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    /// The `User` that owns this `Reminder` and will receive the notification
    pub user_id: ID,
    /// The `Event` this `Reminder` is about
    pub event_id: ID,
    /// The timestamp in millis at which the `User` should be notified
    pub remind_at: i64,
    /// Free text written by the `User`, included in the notification
    pub note: String,
    pub created: i64,
    /// Set once the notification has been delivered. Only the reminder
    /// scheduler flips this to `true`.
    pub sent: bool,
}

impl Reminder {
    pub fn new(user_id: ID, event_id: ID, remind_at: i64, note: String, created: i64) -> Self {
        Self {
            id: Default::default(),
            user_id,
            event_id,
            remind_at,
            note,
            created,
            sent: false,
        }
    }

    /// Moves the `Reminder` to a new point in time. A moved `Reminder` is a new
    /// pending notification, so it has to be delivered again.
    pub fn reschedule(&mut self, remind_at: i64) {
        if self.remind_at != remind_at {
            self.remind_at = remind_at;
            self.sent = false;
        }
    }

    pub fn is_due(&self, window: &DueWindow) -> bool {
        !self.sent && window.contains(self.remind_at)
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// A user edit of a `Reminder`. Fields left as `None` are kept as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderChanges {
    pub remind_at: Option<i64>,
    pub note: Option<String>,
}

impl ReminderChanges {
    /// Never touches `sent` unless the `Reminder` actually moves in time
    pub fn apply(&self, reminder: &mut Reminder) {
        if let Some(remind_at) = self.remind_at {
            reminder.reschedule(remind_at);
        }
        if let Some(note) = &self.note {
            reminder.note = note.clone();
        }
    }
}

/// The time span, inclusive in both ends, that the reminder scheduler looks at
/// when searching for `Reminder`s to send.
///
/// It always ends at the current tick and reaches `lookback` millis back so that
/// `Reminder`s that became due while the scheduler was paused are still caught.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueWindow {
    pub start: i64,
    pub end: i64,
}

impl DueWindow {
    pub fn ending_at(now: i64, lookback_millis: i64) -> Self {
        Self {
            start: now.saturating_sub(lookback_millis.max(0)),
            end: now,
        }
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }
}
