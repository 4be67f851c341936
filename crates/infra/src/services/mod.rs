mod notifier;

pub use notifier::{HttpEmailNotifier, IReminderNotifier, InMemoryNotifier, LogNotifier};
