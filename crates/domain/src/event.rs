use crate::shared::entity::{Entity, ID};

/// An `Event` published on the platform that `User`s can set `Reminder`s for.
///
/// Events are managed elsewhere, this is the read-only view needed to
/// render a reminder.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: ID,
    pub title: String,
    pub content: Option<String>,
    pub location: Option<String>,
    pub organization: Option<String>,
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
}

impl Event {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            title: title.into(),
            content: None,
            location: None,
            organization: None,
            start_ts: None,
            end_ts: None,
        }
    }
}

impl Entity for Event {
    fn id(&self) -> &ID {
        &self.id
    }
}
