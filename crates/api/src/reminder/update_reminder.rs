use crate::{
    error::EventHubError,
    shared::{
        auth::protect_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use eventhub_api_structs::update_reminder::*;
use eventhub_domain::{Reminder, ReminderChanges, ID};
use eventhub_infra::{EventHubContext, ReminderStoreError};

fn handle_error(e: UseCaseErrors) -> EventHubError {
    match e {
        UseCaseErrors::NotFound(reminder_id) => EventHubError::NotFound(format!(
            "The reminder with id: {}, was not found.",
            reminder_id
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

pub async fn update_reminder_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<EventHubContext>,
) -> Result<HttpResponse, EventHubError> {
    let user = protect_route(&http_req, &ctx).await?;

    let body = body.0;
    let usecase = UpdateReminderUseCase {
        user_id: user.id,
        reminder_id: path_params.reminder_id.clone(),
        remind_at: body.reminder_time.map(|time| time.timestamp_millis()),
        note: body.note,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct UpdateReminderUseCase {
    pub user_id: ID,
    pub reminder_id: ID,
    pub remind_at: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    ReminderTimeInPast,
    Conflict,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateReminderUseCase {
    type Response = Reminder;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "UpdateReminder";

    async fn execute(&mut self, ctx: &EventHubContext) -> Result<Self::Response, Self::Errors> {
        let reminder = ctx
            .repos
            .reminders
            .find(&self.reminder_id)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        let reminder = match reminder {
            Some(reminder) if reminder.user_id == self.user_id => reminder,
            _ => return Err(UseCaseErrors::NotFound(self.reminder_id.clone())),
        };

        if let Some(remind_at) = self.remind_at {
            if remind_at != reminder.remind_at && remind_at < ctx.sys.get_timestamp_millis() {
                return Err(UseCaseErrors::ReminderTimeInPast);
            }
        }

        // Only the requested fields are written, a concurrent `mark_sent` is kept
        let changes = ReminderChanges {
            remind_at: self.remind_at,
            note: self.note.clone(),
        };
        match ctx.repos.reminders.update(&self.reminder_id, &changes).await {
            Ok(Some(reminder)) => Ok(reminder),
            Ok(None) => Err(UseCaseErrors::NotFound(self.reminder_id.clone())),
            Err(ReminderStoreError::Conflict) => Err(UseCaseErrors::Conflict),
            Err(ReminderStoreError::Storage(_)) => Err(UseCaseErrors::StorageError),
        }
    }
}
