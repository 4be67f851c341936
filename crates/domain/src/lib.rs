mod event;
mod notification;
mod reminder;
mod shared;
mod user;

pub use event::Event;
pub use notification::ReminderNotification;
pub use reminder::{DueWindow, Reminder, ReminderChanges};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use user::User;

pub use chrono_tz::Tz;
