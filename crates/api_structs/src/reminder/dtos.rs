use chrono::{DateTime, TimeZone, Utc};
use eventhub_domain::{Reminder, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDTO {
    pub id: ID,
    pub user_id: ID,
    pub event_id: ID,
    pub reminder_time: DateTime<Utc>,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub sent: bool,
}

impl ReminderDTO {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            id: reminder.id,
            user_id: reminder.user_id,
            event_id: reminder.event_id,
            reminder_time: millis_to_datetime(reminder.remind_at),
            note: reminder.note,
            created_at: millis_to_datetime(reminder.created),
            sent: reminder.sent,
        }
    }
}

fn millis_to_datetime(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ts)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
