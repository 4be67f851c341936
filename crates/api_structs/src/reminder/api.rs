use crate::dtos::ReminderDTO;
use chrono::{DateTime, Utc};
use eventhub_domain::{Reminder, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub reminder: ReminderDTO,
}

impl ReminderResponse {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            reminder: ReminderDTO::new(reminder),
        }
    }
}

pub mod create_reminder {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub event_id: ID,
        pub reminder_time: DateTime<Utc>,
        #[serde(default)]
        pub note: Option<String>,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod get_reminders {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminders: Vec<ReminderDTO>,
    }

    impl APIResponse {
        pub fn new(reminders: Vec<Reminder>) -> Self {
            Self {
                reminders: reminders.into_iter().map(ReminderDTO::new).collect(),
            }
        }
    }
}

pub mod update_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub reminder_time: Option<DateTime<Utc>>,
        #[serde(default)]
        pub note: Option<String>,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod delete_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type APIResponse = ReminderResponse;
}
