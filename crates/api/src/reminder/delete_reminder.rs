use crate::{
    error::EventHubError,
    shared::{
        auth::protect_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use eventhub_api_structs::delete_reminder::*;
use eventhub_domain::{Reminder, ID};
use eventhub_infra::EventHubContext;

pub async fn delete_reminder_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<EventHubContext>,
) -> Result<HttpResponse, EventHubError> {
    let user = protect_route(&http_req, &ctx).await?;

    let usecase = DeleteReminderUseCase {
        user_id: user.id,
        reminder_id: path_params.reminder_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder)))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(reminder_id) => EventHubError::NotFound(format!(
                "The reminder with id: {}, was not found.",
                reminder_id
            )),
            UseCaseErrors::StorageError => EventHubError::InternalError,
        })
}

#[derive(Debug)]
pub struct DeleteReminderUseCase {
    pub user_id: ID,
    pub reminder_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteReminderUseCase {
    type Response = Reminder;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "DeleteReminder";

    async fn execute(&mut self, ctx: &EventHubContext) -> Result<Self::Response, Self::Errors> {
        let reminder = ctx
            .repos
            .reminders
            .find(&self.reminder_id)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        match reminder {
            Some(reminder) if reminder.user_id == self.user_id => {
                match ctx.repos.reminders.delete(&self.reminder_id).await {
                    Some(reminder) => Ok(reminder),
                    None => Err(UseCaseErrors::StorageError),
                }
            }
            _ => Err(UseCaseErrors::NotFound(self.reminder_id.clone())),
        }
    }
}
