use crate::{
    error::EventHubError,
    shared::{
        auth::protect_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use eventhub_api_structs::create_reminder::*;
use eventhub_domain::{Reminder, ID};
use eventhub_infra::{EventHubContext, ReminderStoreError};

fn handle_error(e: UseCaseErrors) -> EventHubError {
    match e {
        UseCaseErrors::EventNotFound(event_id) => EventHubError::NotFound(format!(
            "The event with id: {}, was not found.",
            event_id
        )),
        UseCaseErrors::ReminderTimeInPast => {
            EventHubError::BadClientData("The reminder time must not be in the past.".into())
        }
        UseCaseErrors::Conflict => EventHubError::Conflict(
            "A reminder for this event at the given time already exists.".into(),
        ),
        UseCaseErrors::StorageError => EventHubError::InternalError,
    }
}

pub async fn create_reminder_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<EventHubContext>,
) -> Result<HttpResponse, EventHubError> {
    let user = protect_route(&http_req, &ctx).await?;

    let body = body.0;
    let usecase = CreateReminderUseCase {
        user_id: user.id,
        event_id: body.event_id,
        remind_at: body.reminder_time.timestamp_millis(),
        note: body.note.unwrap_or_default(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Created().json(APIResponse::new(reminder)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct CreateReminderUseCase {
    pub user_id: ID,
    pub event_id: ID,
    pub remind_at: i64,
    pub note: String,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    EventNotFound(ID),
    ReminderTimeInPast,
    Conflict,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateReminderUseCase {
    type Response = Reminder;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "CreateReminder";

    async fn execute(&mut self, ctx: &EventHubContext) -> Result<Self::Response, Self::Errors> {
        match ctx.repos.events.find(&self.event_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(UseCaseErrors::EventNotFound(self.event_id.clone())),
            Err(_) => return Err(UseCaseErrors::StorageError),
        }

        let now = ctx.sys.get_timestamp_millis();
        if self.remind_at < now {
            return Err(UseCaseErrors::ReminderTimeInPast);
        }

        let reminder = Reminder::new(
            self.user_id.clone(),
            self.event_id.clone(),
            self.remind_at,
            self.note.clone(),
            now,
        );

        match ctx.repos.reminders.insert(&reminder).await {
            Ok(_) => Ok(reminder),
            Err(ReminderStoreError::Conflict) => Err(UseCaseErrors::Conflict),
            Err(ReminderStoreError::Storage(_)) => Err(UseCaseErrors::StorageError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventhub_domain::{Event, User};
    use eventhub_infra::{ISys, InMemoryEventRepo, InMemoryUserRepo};
    use std::sync::Arc;

    const NOW: i64 = 1_700_000_000_000;

    struct StaticTimeSys;
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            NOW
        }
    }

    struct TestContext {
        ctx: EventHubContext,
        user: User,
        event: Event,
    }

    async fn setup() -> TestContext {
        let mut ctx = EventHubContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys);
        let user = User::new("Hoa", "hoa@example.com");
        let users = Arc::new(InMemoryUserRepo::new());
        users.insert(&user);
        ctx.repos.users = users;
        let event = Event::new("Career fair");
        let events = Arc::new(InMemoryEventRepo::new());
        events.insert(&event);
        ctx.repos.events = events;
        TestContext { ctx, user, event }
    }

    fn usecase(tctx: &TestContext, remind_at: i64) -> CreateReminderUseCase {
        CreateReminderUseCase {
            user_id: tctx.user.id.clone(),
            event_id: tctx.event.id.clone(),
            remind_at,
            note: "Bring CV".into(),
        }
    }

    #[actix_web::main]
    #[test]
    async fn creates_reminder() {
        let tctx = setup().await;
        let reminder = execute(usecase(&tctx, NOW + 1000), &tctx.ctx)
            .await
            .expect("To create reminder");
        assert!(!reminder.sent);
        assert_eq!(reminder.created, NOW);
        assert_eq!(reminder.note, "Bring CV");
        assert_eq!(
            tctx.ctx.repos.reminders.find(&reminder.id).await.unwrap(),
            Some(reminder)
        );
    }

    #[actix_web::main]
    #[test]
    async fn rejects_duplicate_reminder() {
        let tctx = setup().await;
        assert!(execute(usecase(&tctx, NOW + 1000), &tctx.ctx).await.is_ok());
        assert!(matches!(
            execute(usecase(&tctx, NOW + 1000), &tctx.ctx).await,
            Err(UseCaseErrors::Conflict)
        ));
    }

    #[actix_web::main]
    #[test]
    async fn rejects_reminder_for_unknown_event_or_in_the_past() {
        let tctx = setup().await;
        let mut unknown_event = usecase(&tctx, NOW + 1000);
        unknown_event.event_id = ID::new();
        assert!(matches!(
            execute(unknown_event, &tctx.ctx).await,
            Err(UseCaseErrors::EventNotFound(_))
        ));

        assert!(matches!(
            execute(usecase(&tctx, NOW - 1), &tctx.ctx).await,
            Err(UseCaseErrors::ReminderTimeInPast)
        ));
    }
}
