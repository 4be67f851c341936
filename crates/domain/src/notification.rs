use crate::{event::Event, reminder::Reminder, user::User};
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;

/// Everything needed to tell a `User` about an upcoming `Event`
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderNotification {
    pub recipient_email: String,
    pub recipient_name: String,
    pub event: Event,
    pub note: String,
    pub remind_at: i64,
}

impl ReminderNotification {
    pub fn new(reminder: &Reminder, user: &User, event: Event) -> Self {
        Self {
            recipient_email: user.email.clone(),
            recipient_name: user.name.clone(),
            event,
            note: reminder.note.clone(),
            remind_at: reminder.remind_at,
        }
    }

    pub fn subject(&self) -> String {
        format!("Reminder: {}", self.event.title)
    }

    /// Plain text body of the notification with all times rendered in `tz`
    pub fn render_text(&self, tz: &Tz) -> String {
        let mut lines = vec![
            format!("Hi {},", self.recipient_name),
            String::new(),
            format!(
                "This is your reminder for \"{}\" set for {}.",
                self.event.title,
                format_timestamp(self.remind_at, tz)
            ),
            String::new(),
        ];

        if let Some(start_ts) = self.event.start_ts {
            lines.push(format!("Starts: {}", format_timestamp(start_ts, tz)));
        }
        if let Some(end_ts) = self.event.end_ts {
            lines.push(format!("Ends: {}", format_timestamp(end_ts, tz)));
        }
        if let Some(location) = non_empty(&self.event.location) {
            lines.push(format!("Location: {}", location));
        }
        if let Some(organization) = non_empty(&self.event.organization) {
            lines.push(format!("Organized by: {}", organization));
        }
        if !self.note.trim().is_empty() {
            lines.push(String::new());
            lines.push(format!("Your note: {}", self.note.trim()));
        }

        lines.join("\n")
    }
}

fn non_empty(val: &Option<String>) -> Option<&str> {
    val.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn format_timestamp(ts: i64, tz: &Tz) -> String {
    match Utc.timestamp_millis_opt(ts).single() {
        Some(dt) => dt.with_timezone(tz).format("%Y-%m-%d %H:%M %Z").to_string(),
        None => ts.to_string(),
    }
}
